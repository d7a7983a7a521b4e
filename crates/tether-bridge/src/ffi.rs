// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C commands for the native loop.
//
// The native library links against this one and calls these from any
// thread. They act on the live bridge; with none installed they do nothing
// and return their sentinel.
//
//     void    tether_show_keyboard(void);
//     void    tether_hide_keyboard(void);
//     int32_t tether_show_file_open(void);
//     int32_t tether_get_rune(int32_t device_id, int32_t key_code, int32_t meta_state);
//     char   *tether_tmp_dir(void);
//     void    tether_free_string(char *s);

use std::ffi::{CString, c_char};

use tether_core::types::NO_RUNE;

use crate::bridge::Bridge;
use crate::live::LIVE_BRIDGE;

/// `tether_show_file_open`: request launched.
pub const TETHER_OK: i32 = 0;
/// `tether_show_file_open`: a request is already outstanding.
pub const TETHER_PICKER_BUSY: i32 = 1;
/// No bridge is live.
pub const TETHER_NO_BRIDGE: i32 = 2;

fn live() -> Option<Bridge> {
    let bridge = LIVE_BRIDGE.current();
    if bridge.is_none() {
        tracing::debug!("no live bridge; native command ignored");
    }
    bridge
}

#[unsafe(no_mangle)]
pub extern "C" fn tether_show_keyboard() {
    if let Some(bridge) = live() {
        bridge.show_keyboard();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn tether_hide_keyboard() {
    if let Some(bridge) = live() {
        bridge.hide_keyboard();
    }
}

/// The result arrives later through `tether_on_file_picker_returned`.
#[unsafe(no_mangle)]
pub extern "C" fn tether_show_file_open() -> i32 {
    let Some(bridge) = live() else {
        return TETHER_NO_BRIDGE;
    };
    match bridge.show_file_open() {
        Ok(()) => TETHER_OK,
        // Busy is the only error the bridge reports.
        Err(_) => TETHER_PICKER_BUSY,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn tether_get_rune(device_id: i32, key_code: i32, meta_state: i32) -> i32 {
    live().map_or(NO_RUNE, |bridge| bridge.get_rune(device_id, key_code, meta_state))
}

/// Host cache directory, empty if unavailable. Free with `tether_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn tether_tmp_dir() -> *mut c_char {
    let dir = live().map(|bridge| bridge.tmp_dir()).unwrap_or_default();
    CString::new(dir).unwrap_or_default().into_raw()
}

/// Free a string returned by this library.
///
/// # Safety
/// `s` must be null or a pointer returned by `tether_tmp_dir` that has not
/// been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tether_free_string(s: *mut c_char) {
    if !s.is_null() {
        // SAFETY: upheld by the caller.
        drop(unsafe { CString::from_raw(s) });
    }
}
