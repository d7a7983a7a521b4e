// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native library resolution from component metadata.
//
// NativeActivity finds its entry point with its own dlopen, which bypasses
// System.loadLibrary. JNI exports and JNI_OnLoad in that library stay
// invisible to Java until the library is loaded explicitly, so this runs
// before the activity's own onCreate. The bridge's calls into the native side
// go through entry points bound here; a failed load binds none.

use tether_core::error::{Result, TetherError};
use tether_core::types::NativeLibrary;

use crate::traits::{ComponentMetadata, EventSink, LibraryLoader};

/// A loaded native library and the entry points bound from it.
pub struct NativeSide {
    pub library: NativeLibrary,
    pub entry_points: Box<dyn EventSink>,
}

/// Read the library name stored under `key`.
pub fn resolve<M>(metadata: &M, key: &str) -> Result<NativeLibrary>
where
    M: ComponentMetadata + ?Sized,
{
    let raw = metadata.metadata_string(key)?;
    raw.and_then(NativeLibrary::new)
        .ok_or_else(|| TetherError::MissingLibraryName { key: key.to_string() })
}

/// Resolve and load the native library, logging the outcome. On error
/// nothing is bound, so the native side stays unreachable.
pub fn load<H>(host: &H, key: &str) -> Result<NativeSide>
where
    H: ComponentMetadata + LibraryLoader + ?Sized,
{
    match try_load(host, key) {
        Ok(native) => {
            tracing::info!(library = %native.library, "native library loaded");
            Ok(native)
        }
        Err(e) => {
            tracing::error!(error = %e, key, "loadLibrary failed; native side unreachable");
            Err(e)
        }
    }
}

fn try_load<H>(host: &H, key: &str) -> Result<NativeSide>
where
    H: ComponentMetadata + LibraryLoader + ?Sized,
{
    let library = resolve(host, key)?;
    let entry_points = host.load_library(library.name()).map_err(|e| match e {
        TetherError::LibraryLoad { .. } => e,
        other => TetherError::LibraryLoad {
            name: library.name().to_string(),
            reason: other.to_string(),
        },
    })?;
    Ok(NativeSide {
        library,
        entry_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, capture_logs};
    use tether_core::types::NativeEvent;

    const KEY: &str = "android.app.lib_name";

    #[test]
    fn loads_library_named_in_metadata() {
        let host = FakeHost::new().with_metadata(KEY, "game");

        let native = load(&host, KEY).expect("load");

        assert_eq!(native.library, NativeLibrary::new("game").expect("name"));
        assert_eq!(host.loaded_libraries(), vec!["game".to_string()]);
    }

    #[test]
    fn bound_entry_points_reach_the_native_side() {
        let host = FakeHost::new().with_metadata(KEY, "game");
        let rx = host.native_events();

        let native = load(&host, KEY).expect("load");
        native
            .entry_points
            .deliver(NativeEvent::FilePickerReturned("/a".into()));

        assert_eq!(rx.try_recv().ok(), Some(NativeEvent::FilePickerReturned("/a".into())));
    }

    #[test]
    fn missing_metadata_bundle_is_logged_not_fatal() {
        let host = FakeHost::new().without_metadata();

        let (loaded, logs) = capture_logs(|| load(&host, KEY));

        assert!(matches!(loaded, Err(TetherError::MissingMetadata)));
        assert!(host.loaded_libraries().is_empty());
        assert!(logs.contains("loadLibrary failed"), "logs: {logs}");
        assert!(logs.contains("no component metadata"), "logs: {logs}");
    }

    #[test]
    fn missing_key_names_the_key() {
        let host = FakeHost::new();

        let err = resolve(&host, KEY).expect_err("must fail");

        assert!(matches!(err, TetherError::MissingLibraryName { ref key } if key == KEY));
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let host = FakeHost::new().with_metadata(KEY, "  ");
        assert!(matches!(
            resolve(&host, KEY),
            Err(TetherError::MissingLibraryName { .. })
        ));
    }

    #[test]
    fn loader_failure_is_reported_with_library_name() {
        let host = FakeHost::new()
            .with_metadata(KEY, "game")
            .failing_library_load();

        let err = load(&host, KEY).err().expect("must fail");

        assert!(err.to_string().contains("`game`"), "{err}");
        assert!(host.loaded_libraries().is_empty());
    }
}
