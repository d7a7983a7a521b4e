// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entry points the native library exports for the bridge to call.
//
// The library named in component metadata must export, with C linkage:
//
//     void tether_on_insets_changed(TetherInsets insets);
//     void tether_on_file_picker_returned(const char *path);
//
// `path` is NUL-terminated UTF-8 and only valid for the duration of the call.
// Both are called on the host UI thread.

use std::ffi::{CString, c_char};

use libloading::Library;
use tether_core::error::{Result, TetherError};
use tether_core::types::{InsetStrategy, Insets, NativeEvent};

use crate::traits::EventSink;

/// Symbol of the insets entry point.
pub const ON_INSETS_CHANGED: &[u8] = b"tether_on_insets_changed\0";

/// Symbol of the picker result entry point.
pub const ON_FILE_PICKER_RETURNED: &[u8] = b"tether_on_file_picker_returned\0";

/// Insets as passed across the C boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TetherInsets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    /// False when the values came from the visible-frame approximation.
    pub precise: bool,
}

impl TetherInsets {
    pub fn new(insets: Insets, strategy: InsetStrategy) -> Self {
        Self {
            top: insets.top,
            bottom: insets.bottom,
            left: insets.left,
            right: insets.right,
            precise: strategy.is_precise(),
        }
    }
}

type OnInsetsChanged = unsafe extern "C" fn(TetherInsets);
type OnFilePickerReturned = unsafe extern "C" fn(*const c_char);

/// Entry points bound from a loaded native library.
pub struct NativeEntryPoints {
    on_insets_changed: OnInsetsChanged,
    on_file_picker_returned: OnFilePickerReturned,
    // Keeps the function pointers above valid.
    _library: Option<Library>,
}

impl NativeEntryPoints {
    /// Bind the entry points of `lib<name>.so`.
    ///
    /// The host loader should already have loaded the library; this only
    /// takes another reference to it and looks up the symbols.
    pub fn open(name: &str) -> Result<Self> {
        let file = libloading::library_filename(name);
        let load_error = |reason: String| TetherError::LibraryLoad {
            name: name.to_string(),
            reason,
        };

        // SAFETY: loading runs the library's initialisers, which the host
        // loader has already run once for this same library.
        let library = unsafe { Library::new(&file) }.map_err(|e| load_error(e.to_string()))?;

        // SAFETY: the symbol types match the exported C signatures above.
        let on_insets_changed = *unsafe { library.get::<OnInsetsChanged>(ON_INSETS_CHANGED) }
            .map_err(|e| load_error(e.to_string()))?;
        // SAFETY: as above.
        let on_file_picker_returned =
            *unsafe { library.get::<OnFilePickerReturned>(ON_FILE_PICKER_RETURNED) }
                .map_err(|e| load_error(e.to_string()))?;

        tracing::debug!(library = name, "native entry points bound");
        Ok(Self {
            on_insets_changed,
            on_file_picker_returned,
            _library: Some(library),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_fns(
        on_insets_changed: OnInsetsChanged,
        on_file_picker_returned: OnFilePickerReturned,
    ) -> Self {
        Self {
            on_insets_changed,
            on_file_picker_returned,
            _library: None,
        }
    }
}

impl EventSink for NativeEntryPoints {
    fn deliver(&self, event: NativeEvent) {
        match event {
            NativeEvent::InsetsChanged { insets, strategy } => {
                // SAFETY: bound from a library that stays loaded while `self` lives.
                unsafe { (self.on_insets_changed)(TetherInsets::new(insets, strategy)) }
            }
            NativeEvent::FilePickerReturned(path) => {
                let path = CString::new(path).unwrap_or_else(|_| {
                    tracing::warn!("picked path contains NUL; delivering empty path");
                    CString::default()
                });
                // SAFETY: as above; `path` outlives the call.
                unsafe { (self.on_file_picker_returned)(path.as_ptr()) }
            }
        }
    }
}
