// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for the Java activity.
//
// The activity (`org.hyperpolymath.tether.TetherActivity`) declares:
//
//     private native long nativeCreate();
//     private native void nativeOnPostCreate(long handle);
//     private native void nativeOnLayoutChange(long handle);
//     private native void nativeOnActivityResult(long handle, int requestCode,
//                                                int resultCode, Intent data);
//     private native void nativeDestroy(long handle);
//     private static native void nativeRunTask(long task);
//
// `nativeCreate` runs before `super.onCreate` and returns an opaque handle the
// activity passes back on every later call. 0 means creation failed.

use std::ffi::c_void;
use std::sync::atomic::AtomicBool;

use jni::JNIEnv;
use jni::objects::{GlobalRef, JClass, JObject, JString};
use jni::sys::{jint, jlong};

use tether_core::config::BridgeConfig;
use tether_core::error::{Result, TetherError};

use super::{clear_exception, jni_err};
use crate::bridge::{Bridge, config_from_metadata, config_or_default};
use crate::instance::InstanceGuard;
use crate::live::LIVE_BRIDGE;
use crate::logging;
use crate::traits::UiTask;

static LIVE: AtomicBool = AtomicBool::new(false);

/// The activity published through `ndk_context` while a session lives.
struct PublishedContext {
    _activity: GlobalRef,
}

impl PublishedContext {
    fn publish(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("GetJavaVM", e))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| jni_err("NewGlobalRef(activity)", e))?;
        // SAFETY: both pointers stay valid until `release_android_context` in
        // Drop; the global ref is held that long. The instance guard ensures
        // no other session has published a context.
        unsafe {
            ndk_context::initialize_android_context(
                vm.get_java_vm_pointer().cast::<c_void>(),
                activity.as_obj().as_raw().cast::<c_void>(),
            );
        }
        Ok(Self {
            _activity: activity,
        })
    }
}

impl Drop for PublishedContext {
    fn drop(&mut self) {
        // SAFETY: paired with the initialise call in `publish`.
        unsafe { ndk_context::release_android_context() };
    }
}

/// State behind a handle returned to Java. Fields drop in order: the bridge
/// before the context it was built from, the instance slot last.
struct Session {
    bridge: Bridge,
    _context: PublishedContext,
    _guard: InstanceGuard,
}

fn create_session(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<jlong> {
    let guard = InstanceGuard::acquire(&LIVE)?;
    let context = PublishedContext::publish(env, activity)?;
    let host = crate::platform_host()?;

    let loaded = config_from_metadata(host.as_ref());
    let filter = loaded
        .as_ref()
        .map_or_else(|_| BridgeConfig::default().log_filter, |c| c.log_filter.clone());
    logging::init(&filter);
    let config = config_or_default(loaded);

    let bridge = Bridge::new(config, host);
    bridge.on_create();
    LIVE_BRIDGE.install(bridge.clone());

    let session = Box::new(Session {
        bridge,
        _context: context,
        _guard: guard,
    });
    Ok(Box::into_raw(session) as jlong)
}

/// Borrow the session behind `handle`.
///
/// # Safety
/// `handle` must be 0 or a value returned by `nativeCreate` that has not been
/// passed to `nativeDestroy`.
unsafe fn session<'a>(handle: jlong) -> Option<&'a Session> {
    // SAFETY: upheld by the caller.
    unsafe { (handle as *const Session).as_ref() }
}

/// `data.getData().getPath()`, or `None` at the first null.
fn intent_path(env: &mut JNIEnv<'_>, data: &JObject<'_>) -> jni::errors::Result<Option<String>> {
    if data.is_null() {
        return Ok(None);
    }
    let uri = env
        .call_method(data, "getData", "()Landroid/net/Uri;", &[])?
        .l()?;
    if uri.is_null() {
        return Ok(None);
    }
    let path = env
        .call_method(&uri, "getPath", "()Ljava/lang/String;", &[])?
        .l()?;
    if path.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(&JString::from(path))?.into()))
}

// ============================================================================
// JNI Entry Points
// ============================================================================

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeCreate<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
) -> jlong {
    match create_session(&mut env, &activity) {
        Ok(handle) => handle,
        Err(e) => {
            // Creation can fail before the configured subscriber is installed.
            logging::init(&BridgeConfig::default().log_filter);
            if matches!(e, TetherError::AlreadyRunning) {
                tracing::warn!(error = %e, "bridge already live; activity left unbridged");
            } else {
                tracing::error!(error = %e, "bridge creation failed");
            }
            0
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeOnPostCreate<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
    handle: jlong,
) {
    // SAFETY: the activity only passes handles it got from nativeCreate.
    if let Some(session) = unsafe { session(handle) } {
        session.bridge.on_post_create();
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeOnLayoutChange<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
    handle: jlong,
) {
    // SAFETY: as above.
    if let Some(session) = unsafe { session(handle) } {
        session.bridge.on_layout_change();
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeOnActivityResult<'local>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    handle: jlong,
    request_code: jint,
    result_code: jint,
    data: JObject<'local>,
) {
    // SAFETY: as above.
    let Some(session) = (unsafe { session(handle) }) else {
        return;
    };

    let path = match intent_path(&mut env, &data) {
        Ok(path) => path,
        Err(e) => {
            clear_exception(&mut env);
            tracing::warn!(error = %e, "could not read result intent data");
            None
        }
    };
    session
        .bridge
        .on_activity_result(request_code, result_code, path);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeDestroy<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
    handle: jlong,
) {
    if handle == 0 {
        return;
    }
    // SAFETY: `handle` came from Box::into_raw in nativeCreate and the
    // activity never uses it again after this call.
    let session = unsafe { Box::from_raw(handle as *mut Session) };

    if !LIVE_BRIDGE.release(&session.bridge) {
        tracing::warn!("destroyed session was not the live bridge");
    }
    drop(session);
    tracing::debug!("bridge session destroyed");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_tether_TetherActivity_nativeRunTask<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    task: jlong,
) {
    if task == 0 {
        return;
    }
    // SAFETY: `task` came from Box::into_raw in AndroidHost::post, and the
    // activity runs each posted task exactly once.
    let task = unsafe { Box::from_raw(task as *mut UiTask) };
    task();
}
