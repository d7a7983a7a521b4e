// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where no activity exists.
//
// Every capability returns `PlatformUnavailable`; the bridge folds those into
// its usual sentinels, so a bridge over this host starts, emits nothing and
// answers every rune lookup with -1.

use std::path::PathBuf;

use tether_core::error::{Result, TetherError};
use tether_core::types::{Insets, Rect, Size};

use crate::traits::*;

/// No-op host returned on non-Android platforms.
pub struct StubHost;

impl Host for StubHost {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl ComponentMetadata for StubHost {
    fn metadata_string(&self, _key: &str) -> Result<Option<String>> {
        Err(TetherError::MissingMetadata)
    }
}

impl LibraryLoader for StubHost {
    fn load_library(&self, _name: &str) -> Result<Box<dyn EventSink>> {
        tracing::warn!("LibraryLoader::load_library called on stub host");
        Err(TetherError::PlatformUnavailable)
    }
}

impl LayoutObserver for StubHost {
    fn observe_layout(&self) -> Result<()> {
        Err(TetherError::PlatformUnavailable)
    }
}

impl WindowGeometry for StubHost {
    fn api_level(&self) -> u32 {
        0
    }

    fn root_window_insets(&self) -> Result<Option<Insets>> {
        Err(TetherError::PlatformUnavailable)
    }

    fn visible_display_frame(&self) -> Result<Rect> {
        Err(TetherError::PlatformUnavailable)
    }

    fn root_view_size(&self) -> Result<Size> {
        Err(TetherError::PlatformUnavailable)
    }
}

impl CharacterMaps for StubHost {
    fn character(&self, device_id: i32, _key_code: i32, _meta_state: i32) -> Result<u32> {
        Err(TetherError::CharacterMapUnavailable { device_id })
    }
}

impl InputMethod for StubHost {
    fn show_soft_input(&self) -> Result<()> {
        tracing::warn!("InputMethod::show_soft_input called on stub host");
        Err(TetherError::PlatformUnavailable)
    }

    fn hide_soft_input(&self) -> Result<()> {
        tracing::warn!("InputMethod::hide_soft_input called on stub host");
        Err(TetherError::PlatformUnavailable)
    }
}

impl DocumentLauncher for StubHost {
    fn launch_open_document(&self, _request: &OpenDocumentRequest) -> Result<()> {
        tracing::warn!("DocumentLauncher::launch_open_document called on stub host");
        Err(TetherError::PlatformUnavailable)
    }
}

impl UiThread for StubHost {
    // No separate UI thread off Android; posted work runs in place.
    fn is_ui_thread(&self) -> bool {
        true
    }

    fn post(&self, task: UiTask) -> Result<()> {
        task();
        Ok(())
    }
}

impl CacheDirectory for StubHost {
    fn cache_dir(&self) -> Result<PathBuf> {
        Err(TetherError::PlatformUnavailable)
    }
}
