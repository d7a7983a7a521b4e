// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One live bridge per process.

use std::sync::atomic::{AtomicBool, Ordering};

use tether_core::error::{Result, TetherError};

/// Held for as long as a bridge instance is live. Dropping it frees the slot.
#[derive(Debug)]
pub struct InstanceGuard {
    flag: &'static AtomicBool,
}

impl InstanceGuard {
    /// Claim `flag`. Fails with `AlreadyRunning` while another guard holds it.
    pub fn acquire(flag: &'static AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TetherError::AlreadyRunning)?;
        Ok(Self { flag })
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
