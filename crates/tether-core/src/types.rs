// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Tether host bridge.

use serde::{Deserialize, Serialize};

/// Returned by rune lookups when no character is produced.
pub const NO_RUNE: i32 = -1;

/// Host result code for a successful activity result (`Activity.RESULT_OK`).
pub const RESULT_OK: i32 = -1;

/// Host result code for a cancelled activity result (`Activity.RESULT_CANCELED`).
pub const RESULT_CANCELED: i32 = 0;

/// Pixel margins by which system UI obscures the window on each edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Insets {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Build from signed values, clamping each edge into `0..=u32::MAX`.
    pub fn from_signed(top: i64, bottom: i64, left: i64, right: i64) -> Self {
        let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        Self::new(clamp(top), clamp(bottom), clamp(left), clamp(right))
    }
}

/// Which computation produced an [`Insets`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsetStrategy {
    /// Read directly from the window's root insets. Exact per edge.
    WindowInsets,
    /// Derived by diffing the visible display frame against the root view.
    /// Conflates every obscuring region (IME, system bars) into the edges, so
    /// treat it as approximate.
    VisibleFrame,
}

impl InsetStrategy {
    pub fn is_precise(self) -> bool {
        matches!(self, Self::WindowInsets)
    }
}

/// Axis-aligned rectangle in window pixels, edges as the host reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Full bounds of a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A single key-to-rune lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRequest {
    pub device_id: i32,
    pub key_code: i32,
    pub meta_state: i32,
}

impl KeyRequest {
    pub fn new(device_id: i32, key_code: i32, meta_state: i32) -> Self {
        Self {
            device_id,
            key_code,
            meta_state,
        }
    }
}

/// Library name resolved from the activity's component metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeLibrary(String);

impl NativeLibrary {
    /// Returns `None` for an empty or whitespace-only name.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of the startup library load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryStatus {
    /// Startup has not run yet.
    Pending,
    /// The library was loaded and its native entry points are bound.
    Loaded(NativeLibrary),
    /// Loading was skipped or failed; the message is the logged error.
    Failed(String),
}

impl LibraryStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Events delivered to the native application loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// A layout pass produced new window insets.
    InsetsChanged {
        insets: Insets,
        strategy: InsetStrategy,
    },
    /// A file picker request resolved. Empty path means cancelled or failed.
    FilePickerReturned(String),
}

/// What the bridge did with an activity result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    /// Request code belongs to someone else; nothing was emitted.
    Ignored,
    /// A picker result was delivered to the native side.
    Delivered,
}
