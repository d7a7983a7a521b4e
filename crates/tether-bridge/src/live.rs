// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The process's live bridge, reachable from the C command exports.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::bridge::Bridge;

/// Bridge installed by the activity glue for the native loop to command.
pub static LIVE_BRIDGE: LiveBridge = LiveBridge::new();

/// Slot holding at most one bridge handle.
pub struct LiveBridge {
    slot: Mutex<Option<Bridge>>,
}

impl LiveBridge {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn install(&self, bridge: Bridge) {
        if self.slot().replace(bridge).is_some() {
            tracing::warn!("replacing a live bridge that was never released");
        }
    }

    pub fn current(&self) -> Option<Bridge> {
        self.slot().clone()
    }

    /// Empty the slot if it still holds `bridge`. A newer bridge installed in
    /// the meantime stays.
    pub fn release(&self, bridge: &Bridge) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|live| live.ptr_eq(bridge)) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Bridge>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LiveBridge {
    fn default() -> Self {
        Self::new()
    }
}
