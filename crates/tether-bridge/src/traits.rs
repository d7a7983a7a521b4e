// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for host capabilities.
//
// The host (Android activity, or a stub on desktop) is a black box the bridge
// calls into. Each capability is its own trait so tests can fake exactly the
// parts they exercise.

use std::path::PathBuf;

use tether_core::error::Result;
use tether_core::types::{Insets, NativeEvent, Rect, Size};

/// Unified host that groups every capability the bridge needs.
pub trait Host:
    ComponentMetadata
    + LibraryLoader
    + LayoutObserver
    + WindowGeometry
    + CharacterMaps
    + InputMethod
    + DocumentLauncher
    + CacheDirectory
    + UiThread
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// Read string values from the hosting activity's component metadata.
pub trait ComponentMetadata {
    /// Look up `key`.
    ///
    /// Returns `Err(MissingMetadata)` when the activity has no metadata at
    /// all, `Ok(None)` when the bundle exists but lacks the key.
    fn metadata_string(&self, key: &str) -> Result<Option<String>>;
}

/// The host's dynamic library loader.
pub trait LibraryLoader {
    /// Load a library by its short name (`main` for `libmain.so`) and bind the
    /// entry points the bridge calls on the native side.
    fn load_library(&self, name: &str) -> Result<Box<dyn EventSink>>;
}

/// Hook the bridge's layout callback into the root view.
pub trait LayoutObserver {
    /// Start delivering layout changes of the root view to the bridge.
    fn observe_layout(&self) -> Result<()>;
}

/// Window geometry queries backing the inset tracker.
pub trait WindowGeometry {
    /// Host API level, used to pick an inset strategy.
    fn api_level(&self) -> u32;

    /// System-window insets from the root window insets accessor.
    /// `Ok(None)` while the view is not attached.
    fn root_window_insets(&self) -> Result<Option<Insets>>;

    /// The visible display frame of the window's decor view.
    fn visible_display_frame(&self) -> Result<Rect>;

    /// Full bounds of the root view.
    fn root_view_size(&self) -> Result<Size>;
}

/// Per-device key character maps.
pub trait CharacterMaps {
    /// Character produced by `key_code` under `meta_state` on `device_id`.
    ///
    /// Returns 0 when the key has no mapping, and
    /// `Err(CharacterMapUnavailable)` when the device has no map.
    fn character(&self, device_id: i32, key_code: i32, meta_state: i32) -> Result<u32>;
}

/// Soft keyboard control through the host input method service.
pub trait InputMethod {
    /// Ask the input method to show the soft keyboard for the root view.
    fn show_soft_input(&self) -> Result<()>;

    /// Ask the input method to hide the soft keyboard from the root view's window.
    fn hide_soft_input(&self) -> Result<()>;
}

/// An open-document request as the host should launch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocumentRequest {
    pub mime_type: String,
    pub chooser_title: String,
    pub request_code: i32,
}

/// Launch host activities whose results come back asynchronously.
pub trait DocumentLauncher {
    /// Start an open-document flow for result. Returns once the request has
    /// been handed to the host.
    fn launch_open_document(&self, request: &OpenDocumentRequest) -> Result<()>;
}

/// Host-provided scratch storage.
pub trait CacheDirectory {
    /// Absolute path of the application's cache directory.
    fn cache_dir(&self) -> Result<PathBuf>;
}

/// Work queued for the host UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// The host's UI thread, where view and activity calls must run.
pub trait UiThread {
    /// Whether the calling thread is the UI thread.
    fn is_ui_thread(&self) -> bool;

    /// Queue `task` to run on the UI thread. On error the task was dropped
    /// without running.
    fn post(&self, task: UiTask) -> Result<()>;
}

/// Receiver of events bound for the native application loop.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: NativeEvent);
}
