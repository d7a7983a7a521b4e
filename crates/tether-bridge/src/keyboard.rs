// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Soft keyboard visibility. Fire-and-forget: host failures are logged only.

use crate::traits::InputMethod;

pub fn show<I: InputMethod + ?Sized>(ime: &I) {
    if let Err(e) = ime.show_soft_input() {
        tracing::warn!(error = %e, "showSoftInput failed");
    }
}

pub fn hide<I: InputMethod + ?Sized>(ime: &I) {
    if let Err(e) = ime.hide_soft_input() {
        tracing::warn!(error = %e, "hideSoftInputFromWindow failed");
    }
}
