// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Tether: host activity bridge.
//!
//! Translates host lifecycle events (layout changes, activity results,
//! startup) into [`NativeEvent`](tether_core::NativeEvent)s for the embedded
//! native loop, and runs the loop's commands (soft keyboard, document picker,
//! key rune lookup) against the host.
//!
//! Nothing here panics or returns an error across the native boundary: every
//! failure becomes a sentinel (`-1`, empty string), a no-op, or a log line.
//!
//! Built as a `cdylib`, this is the library the activity loads first. It
//! loads the native loop's library, calls into it through the entry points in
//! [`native`], and takes its commands through the C functions in [`ffi`].

pub mod bridge;
pub mod ffi;
pub mod file_picker;
pub mod insets;
pub mod instance;
pub mod keyboard;
pub mod keys;
pub mod library;
pub mod live;
pub mod logging;
pub mod native;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

#[cfg(test)]
mod testing;

pub use bridge::Bridge;

use tether_core::error::Result;

/// Builds the host implementation for the target operating system.
///
/// RETURNS: a boxed trait object (`dyn Host`) hiding the platform SDK.
pub fn platform_host() -> Result<Box<dyn traits::Host>> {
    #[cfg(target_os = "android")]
    {
        // Android: the activity published through ndk-context when the
        // session was created.
        Ok(Box::new(android::AndroidHost::from_ndk_context()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no activity; every capability reports unavailable.
        Ok(Box::new(stub::StubHost))
    }
}
