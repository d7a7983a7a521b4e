// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document picker handshake.
//
// `show_file_open` launches the host picker and returns at once. The host
// later reports back through `on_activity_result` carrying the same request
// code. One slot: a second request while one is outstanding is rejected.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tether_core::config::BridgeConfig;
use tether_core::error::{Result, TetherError};
use tether_core::types::{RESULT_OK, ResultDisposition};

use crate::traits::{DocumentLauncher, OpenDocumentRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Idle,
    Requested,
}

/// Correlates picker launches with their asynchronous results.
pub struct FilePicker {
    request: OpenDocumentRequest,
    state: Mutex<PickerState>,
}

impl FilePicker {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            request: OpenDocumentRequest {
                mime_type: config.file_open_mime_type.clone(),
                chooser_title: config.file_picker_title.clone(),
                request_code: config.file_open_request_code,
            },
            state: Mutex::new(PickerState::Idle),
        }
    }

    pub fn request_code(&self) -> i32 {
        self.request.request_code
    }

    pub fn state(&self) -> PickerState {
        *self.slot()
    }

    /// Launch the picker: [`begin`](Self::begin) then
    /// [`launch`](Self::launch) on the calling thread.
    pub fn show_file_open<L>(&self, launcher: &L, on_result: impl FnOnce(String)) -> Result<()>
    where
        L: DocumentLauncher + ?Sized,
    {
        self.begin()?;
        self.launch(launcher, on_result);
        Ok(())
    }

    /// Claim the slot for a new request.
    ///
    /// Returns `Err(PickerBusy)` without touching the outstanding request if
    /// one is already in flight.
    pub fn begin(&self) -> Result<()> {
        let mut slot = self.slot();
        if *slot == PickerState::Requested {
            tracing::warn!(
                request_code = self.request.request_code,
                "file picker already open; rejecting second request"
            );
            return Err(TetherError::PickerBusy);
        }
        *slot = PickerState::Requested;
        Ok(())
    }

    /// Hand the claimed request to the host. If the host refuses, the request
    /// resolves immediately through `on_result` with an empty path.
    pub fn launch<L>(&self, launcher: &L, on_result: impl FnOnce(String))
    where
        L: DocumentLauncher + ?Sized,
    {
        match launcher.launch_open_document(&self.request) {
            Ok(()) => {
                tracing::info!(
                    request_code = self.request.request_code,
                    mime = %self.request.mime_type,
                    "open-document intent dispatched; awaiting activity result"
                );
            }
            Err(e) => self.abandon(&e, on_result),
        }
    }

    /// Resolve a claimed request that never reached the host.
    pub fn abandon(&self, error: &TetherError, on_result: impl FnOnce(String)) {
        tracing::error!(error = %error, "failed to launch file picker");
        *self.slot() = PickerState::Idle;
        on_result(String::new());
    }

    /// Handle an activity result from the host.
    ///
    /// `data_path` is the selected item's path, if the host returned one.
    pub fn on_activity_result(
        &self,
        request_code: i32,
        result_code: i32,
        data_path: Option<String>,
        on_result: impl FnOnce(String),
    ) -> ResultDisposition {
        if request_code != self.request.request_code {
            tracing::trace!(request_code, "activity result for another request; ignoring");
            return ResultDisposition::Ignored;
        }

        let previous = std::mem::replace(&mut *self.slot(), PickerState::Idle);
        if previous == PickerState::Idle {
            tracing::warn!(request_code, "picker result arrived with no outstanding request");
        }

        let path = if result_code != RESULT_OK {
            tracing::info!(result_code, "file picker cancelled");
            String::new()
        } else {
            match data_path {
                Some(path) => {
                    tracing::info!(path = %path, "file picker returned");
                    path
                }
                None => {
                    tracing::warn!("file picker succeeded without data");
                    String::new()
                }
            }
        };

        on_result(path);
        ResultDisposition::Delivered
    }

    fn slot(&self) -> MutexGuard<'_, PickerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use tether_core::types::RESULT_CANCELED;

    fn picker() -> FilePicker {
        FilePicker::new(&BridgeConfig::default())
    }

    #[test]
    fn launch_uses_configured_request() {
        let host = FakeHost::new();
        let picker = picker();

        picker
            .show_file_open(&host, |_| panic!("no immediate result"))
            .expect("launch");

        let launched = host.launched_requests();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].mime_type, "*/*");
        assert_eq!(launched[0].chooser_title, "Open File");
        assert_eq!(launched[0].request_code, 1);
        assert_eq!(picker.state(), PickerState::Requested);
    }

    #[test]
    fn success_delivers_path_once() {
        let host = FakeHost::new();
        let picker = picker();
        let mut results = Vec::new();

        picker.show_file_open(&host, |p| results.push(p)).expect("launch");
        let disposition =
            picker.on_activity_result(1, RESULT_OK, Some("/docs/a.txt".into()), |p| results.push(p));

        assert_eq!(disposition, ResultDisposition::Delivered);
        assert_eq!(results, vec!["/docs/a.txt".to_string()]);
        assert_eq!(picker.state(), PickerState::Idle);
    }

    #[test]
    fn cancel_delivers_empty_path() {
        let host = FakeHost::new();
        let picker = picker();
        let mut results = Vec::new();

        picker.show_file_open(&host, |p| results.push(p)).expect("launch");
        picker.on_activity_result(1, RESULT_CANCELED, None, |p| results.push(p));

        assert_eq!(results, vec![String::new()]);
    }

    #[test]
    fn foreign_request_code_is_ignored() {
        let host = FakeHost::new();
        let picker = picker();
        let mut results: Vec<String> = Vec::new();

        picker.show_file_open(&host, |p| results.push(p)).expect("launch");
        let disposition =
            picker.on_activity_result(99, RESULT_OK, Some("/x".into()), |p| results.push(p));

        assert_eq!(disposition, ResultDisposition::Ignored);
        assert!(results.is_empty());
        assert_eq!(picker.state(), PickerState::Requested);
    }

    #[test]
    fn second_request_is_rejected() {
        let host = FakeHost::new();
        let picker = picker();

        picker.show_file_open(&host, |_| {}).expect("first launch");
        let err = picker.show_file_open(&host, |_| {}).expect_err("second launch");

        assert!(matches!(err, TetherError::PickerBusy));
        assert_eq!(host.launched_requests().len(), 1);
        assert_eq!(picker.state(), PickerState::Requested);
    }

    #[test]
    fn new_request_allowed_after_resolution() {
        let host = FakeHost::new();
        let picker = picker();

        picker.show_file_open(&host, |_| {}).expect("first launch");
        picker.on_activity_result(1, RESULT_CANCELED, None, |_| {});
        picker.show_file_open(&host, |_| {}).expect("second launch");

        assert_eq!(host.launched_requests().len(), 2);
    }

    #[test]
    fn launch_failure_resolves_with_empty_path() {
        let host = FakeHost::new().failing_launches();
        let picker = picker();
        let mut results = Vec::new();

        picker.show_file_open(&host, |p| results.push(p)).expect("not busy");

        assert_eq!(results, vec![String::new()]);
        assert_eq!(picker.state(), PickerState::Idle);
    }

    #[test]
    fn abandoned_request_frees_the_slot() {
        let picker = picker();
        let mut results = Vec::new();

        picker.begin().expect("claim");
        picker.abandon(&TetherError::PlatformUnavailable, |p| results.push(p));

        assert_eq!(results, vec![String::new()]);
        picker.begin().expect("claim again");
    }

    #[test]
    fn success_without_data_is_empty_path() {
        let host = FakeHost::new();
        let picker = picker();
        let mut results = Vec::new();

        picker.show_file_open(&host, |_| {}).expect("launch");
        picker.on_activity_result(1, RESULT_OK, None, |p| results.push(p));

        assert_eq!(results, vec![String::new()]);
    }

    #[test]
    fn late_result_while_idle_is_still_delivered() {
        let picker = picker();
        let mut results = Vec::new();

        let disposition =
            picker.on_activity_result(1, RESULT_OK, Some("/docs/b.pdf".into()), |p| results.push(p));

        assert_eq!(disposition, ResultDisposition::Delivered);
        assert_eq!(results, vec!["/docs/b.pdf".to_string()]);
    }
}
