// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key code to rune resolution.

use tether_core::error::TetherError;
use tether_core::types::{KeyRequest, NO_RUNE};

use crate::traits::CharacterMaps;

/// Flag the host sets on dead keys (`KeyCharacterMap.COMBINING_ACCENT`).
pub const COMBINING_ACCENT: u32 = 0x8000_0000;

/// Resolve a key press to a code point, or `None` if it produces nothing.
pub fn resolve<M>(maps: &M, request: KeyRequest) -> Option<u32>
where
    M: CharacterMaps + ?Sized,
{
    match maps.character(request.device_id, request.key_code, request.meta_state) {
        Ok(0) => None,
        Ok(rune) if rune & COMBINING_ACCENT != 0 => {
            tracing::trace!(?request, "dead key");
            None
        }
        Ok(rune) => Some(rune),
        Err(TetherError::CharacterMapUnavailable { device_id }) => {
            tracing::debug!(device_id, "no key character map for device");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, ?request, "exception reading KeyCharacterMap");
            None
        }
    }
}

/// Boundary form of [`resolve`]: the code point, or [`NO_RUNE`].
pub fn get_rune<M>(maps: &M, device_id: i32, key_code: i32, meta_state: i32) -> i32
where
    M: CharacterMaps + ?Sized,
{
    resolve(maps, KeyRequest::new(device_id, key_code, meta_state))
        .and_then(|rune| i32::try_from(rune).ok())
        .unwrap_or(NO_RUNE)
}
