// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Tether.
//
// None of these cross the native boundary. Every bridge operation folds them
// into a sentinel value, a no-op, or a log line before returning.

use thiserror::Error;

/// Top-level error type for all Tether operations.
#[derive(Debug, Error)]
pub enum TetherError {
    // -- Startup configuration --
    #[error("activity has no component metadata")]
    MissingMetadata,

    #[error("component metadata has no library name under `{key}`")]
    MissingLibraryName { key: String },

    #[error("failed to load native library `{name}`: {reason}")]
    LibraryLoad { name: String, reason: String },

    #[error("invalid bridge configuration: {0}")]
    Config(String),

    // -- Host API --
    #[error("key character map unavailable for device {device_id}")]
    CharacterMapUnavailable { device_id: i32 },

    #[error("root view is not attached")]
    NoRootView,

    #[error("host call failed: {0}")]
    Host(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Bridge state --
    #[error("a file picker request is already outstanding")]
    PickerBusy,

    #[error("a bridge instance is already live in this process")]
    AlreadyRunning,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TetherError>;

impl TetherError {
    /// Whether this error is a startup configuration problem (as opposed to a
    /// transient host failure). Configuration errors leave the native side
    /// unreachable for the rest of the process.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingMetadata
                | Self::MissingLibraryName { .. }
                | Self::LibraryLoad { .. }
                | Self::Config(_)
        )
    }
}
