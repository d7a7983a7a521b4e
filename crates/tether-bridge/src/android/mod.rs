// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each host capability calls the corresponding
// Android API through JNI on the hosting activity.
//
// ## Java side
//
// The activity must be a `NativeActivity` subclass (see `exports.rs` for the
// `native*` methods it declares) and provide two plain Java methods:
//
//     void registerLayoutObserver()
//     void postToUiThread(long task)
//
// The first adds a `View.OnLayoutChangeListener` to the root view that calls
// `nativeOnLayoutChange(handle)`. The second runs `nativeRunTask(task)` via
// `runOnUiThread`. Listener and `Runnable` objects cannot be created from
// native code without a Java class, so this glue stays in Java.

#![cfg(target_os = "android")]

mod exports;

use std::path::PathBuf;

use jni::JNIEnv;
use jni::JavaVM;
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::jlong;

use tether_core::error::{Result, TetherError};
use tether_core::types::{Insets, Rect, Size};

use crate::native::NativeEntryPoints;
use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// `android.R.id.content`.
const ANDROID_R_ID_CONTENT: i32 = 0x0102_0002;

/// `PackageManager.GET_META_DATA`.
const GET_META_DATA: i32 = 0x80;

/// Capacity of the local reference frame opened around each host call.
const LOCAL_FRAME_CAPACITY: i32 = 16;

/// Error inside a JNI call sequence: either a raw JNI failure (a Java
/// exception may be pending) or a bridge error raised on purpose.
enum CallError {
    Jni(jni::errors::Error),
    Tether(TetherError),
}

impl From<jni::errors::Error> for CallError {
    fn from(e: jni::errors::Error) -> Self {
        Self::Jni(e)
    }
}

impl From<TetherError> for CallError {
    fn from(e: TetherError) -> Self {
        Self::Tether(e)
    }
}

type CallResult<T> = std::result::Result<T, CallError>;

/// Convenience: map any `jni::errors::Error` into `TetherError::Host`.
fn jni_err(context: &str, e: jni::errors::Error) -> TetherError {
    TetherError::Host(format!("{context}: {e}"))
}

/// Clear a pending Java exception so the thread can keep making JNI calls.
fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

// ---------------------------------------------------------------------------
// Host struct
// ---------------------------------------------------------------------------

/// Android implementation of the Tether host.
///
/// Holds the `JavaVM` and a global reference to the hosting activity, so it
/// can be used from the UI thread and from the native loop thread alike.
pub struct AndroidHost {
    vm: JavaVM,
    activity: GlobalRef,
    api_level: u32,
}

impl AndroidHost {
    /// Wrap the activity passed into a JNI entry point.
    pub fn new(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("GetJavaVM", e))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| jni_err("NewGlobalRef(activity)", e))?;

        let api_level = match env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
            .and_then(|v| v.i())
        {
            Ok(level) => u32::try_from(level).unwrap_or(0),
            Err(e) => {
                clear_exception(env);
                return Err(jni_err("Build.VERSION.SDK_INT", e));
            }
        };

        tracing::info!(api_level, "Android host attached");
        Ok(Self {
            vm,
            activity,
            api_level,
        })
    }

    /// Build from the process-wide context published by `nativeCreate`.
    pub fn from_ndk_context() -> Result<Self> {
        let ctx = ndk_context::android_context();
        if ctx.context().is_null() {
            return Err(TetherError::Host(
                "Android context is null; native activity not initialised".into(),
            ));
        }
        // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
        // The pointer is valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| jni_err("failed to obtain JavaVM", e))?;
        let mut env = vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("failed to attach JNI thread", e))?;
        // SAFETY: the NDK guarantees this pointer is a valid global jobject for
        // the hosting Activity.
        let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
        Self::new(&mut env, &activity)
    }

    /// Run `f` on an attached thread inside a local reference frame.
    ///
    /// JNI failures are mapped to `Host("<context>: ...")` and any pending
    /// Java exception is cleared.
    fn call<T>(
        &self,
        context: &str,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'static>) -> CallResult<T>,
    ) -> Result<T> {
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("failed to attach JNI thread", e))?;
        let activity = self.activity.as_obj();

        match env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env, activity)) {
            Ok(value) => Ok(value),
            Err(CallError::Tether(e)) => Err(e),
            Err(CallError::Jni(e)) => {
                clear_exception(&mut env);
                Err(jni_err(context, e))
            }
        }
    }
}

/// `activity.findViewById(android.R.id.content).getRootView()`.
fn root_view<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> CallResult<JObject<'a>> {
    let content = env
        .call_method(
            activity,
            "findViewById",
            "(I)Landroid/view/View;",
            &[JValue::Int(ANDROID_R_ID_CONTENT)],
        )?
        .l()?;
    if content.is_null() {
        return Err(TetherError::NoRootView.into());
    }
    Ok(env
        .call_method(&content, "getRootView", "()Landroid/view/View;", &[])?
        .l()?)
}

/// `activity.getWindow().getDecorView()`.
fn decor_view<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> CallResult<JObject<'a>> {
    let window = env
        .call_method(activity, "getWindow", "()Landroid/view/Window;", &[])?
        .l()?;
    if window.is_null() {
        return Err(TetherError::NoRootView.into());
    }
    Ok(env
        .call_method(&window, "getDecorView", "()Landroid/view/View;", &[])?
        .l()?)
}

/// `activity.getSystemService(INPUT_METHOD_SERVICE)`.
fn input_method_manager<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject<'_>,
) -> CallResult<JObject<'a>> {
    let name = env.new_string("input_method")?;
    let imm = env
        .call_method(
            activity,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&name)],
        )?
        .l()?;
    if imm.is_null() {
        return Err(TetherError::Host("input method service unavailable".into()).into());
    }
    Ok(imm)
}

fn int_method(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> CallResult<i32> {
    Ok(env.call_method(obj, name, "()I", &[])?.i()?)
}

fn int_field(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> CallResult<i32> {
    Ok(env.get_field(obj, name, "I")?.i()?)
}

impl Host for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// ComponentMetadata: PackageManager.getActivityInfo(..., GET_META_DATA)
// ---------------------------------------------------------------------------

impl ComponentMetadata for AndroidHost {
    fn metadata_string(&self, key: &str) -> Result<Option<String>> {
        self.call("getActivityInfo.metaData", |env, activity| {
            let pm = env
                .call_method(
                    activity,
                    "getPackageManager",
                    "()Landroid/content/pm/PackageManager;",
                    &[],
                )?
                .l()?;
            let intent = env
                .call_method(activity, "getIntent", "()Landroid/content/Intent;", &[])?
                .l()?;
            let component = env
                .call_method(
                    &intent,
                    "getComponent",
                    "()Landroid/content/ComponentName;",
                    &[],
                )?
                .l()?;
            let info = env
                .call_method(
                    &pm,
                    "getActivityInfo",
                    "(Landroid/content/ComponentName;I)Landroid/content/pm/ActivityInfo;",
                    &[JValue::Object(&component), JValue::Int(GET_META_DATA)],
                )?
                .l()?;

            let bundle = env
                .get_field(&info, "metaData", "Landroid/os/Bundle;")?
                .l()?;
            if bundle.is_null() {
                return Err(TetherError::MissingMetadata.into());
            }

            let j_key = env.new_string(key)?;
            let value = env
                .call_method(
                    &bundle,
                    "getString",
                    "(Ljava/lang/String;)Ljava/lang/String;",
                    &[JValue::Object(&j_key)],
                )?
                .l()?;
            if value.is_null() {
                return Ok(None);
            }
            let value: String = env.get_string(&JString::from(value))?.into();
            Ok(Some(value))
        })
    }
}

// ---------------------------------------------------------------------------
// LibraryLoader: java.lang.System.loadLibrary, then bind entry points
// ---------------------------------------------------------------------------

impl LibraryLoader for AndroidHost {
    fn load_library(&self, name: &str) -> Result<Box<dyn EventSink>> {
        tracing::info!(library = name, "Android: System.loadLibrary");
        self.call("System.loadLibrary", |env, _activity| {
            let j_name = env.new_string(name)?;
            env.call_static_method(
                "java/lang/System",
                "loadLibrary",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_name)],
            )?;
            Ok(())
        })
        .map_err(|e| TetherError::LibraryLoad {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(NativeEntryPoints::open(name)?))
    }
}

// ---------------------------------------------------------------------------
// LayoutObserver: delegated to the Java activity
// ---------------------------------------------------------------------------

impl LayoutObserver for AndroidHost {
    fn observe_layout(&self) -> Result<()> {
        self.call("registerLayoutObserver", |env, activity| {
            env.call_method(activity, "registerLayoutObserver", "()V", &[])?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// WindowGeometry: WindowInsets (API 23+) and visible display frame
// ---------------------------------------------------------------------------

impl WindowGeometry for AndroidHost {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn root_window_insets(&self) -> Result<Option<Insets>> {
        self.call("getRootWindowInsets", |env, activity| {
            let decor = decor_view(env, activity)?;
            let insets = env
                .call_method(
                    &decor,
                    "getRootWindowInsets",
                    "()Landroid/view/WindowInsets;",
                    &[],
                )?
                .l()?;
            if insets.is_null() {
                return Ok(None);
            }

            let top = int_method(env, &insets, "getSystemWindowInsetTop")?;
            let bottom = int_method(env, &insets, "getSystemWindowInsetBottom")?;
            let left = int_method(env, &insets, "getSystemWindowInsetLeft")?;
            let right = int_method(env, &insets, "getSystemWindowInsetRight")?;
            Ok(Some(Insets::from_signed(
                top.into(),
                bottom.into(),
                left.into(),
                right.into(),
            )))
        })
    }

    fn visible_display_frame(&self) -> Result<Rect> {
        self.call("getWindowVisibleDisplayFrame", |env, activity| {
            let decor = decor_view(env, activity)?;
            let rect = env.new_object("android/graphics/Rect", "()V", &[])?;
            env.call_method(
                &decor,
                "getWindowVisibleDisplayFrame",
                "(Landroid/graphics/Rect;)V",
                &[JValue::Object(&rect)],
            )?;

            Ok(Rect::new(
                int_field(env, &rect, "left")?,
                int_field(env, &rect, "top")?,
                int_field(env, &rect, "right")?,
                int_field(env, &rect, "bottom")?,
            ))
        })
    }

    fn root_view_size(&self) -> Result<Size> {
        self.call("rootView.getWidth/getHeight", |env, activity| {
            let view = root_view(env, activity)?;
            let width = int_method(env, &view, "getWidth")?;
            let height = int_method(env, &view, "getHeight")?;
            Ok(Size::new(width, height))
        })
    }
}

// ---------------------------------------------------------------------------
// CharacterMaps: android.view.KeyCharacterMap
// ---------------------------------------------------------------------------

impl CharacterMaps for AndroidHost {
    fn character(&self, device_id: i32, key_code: i32, meta_state: i32) -> Result<u32> {
        self.call("KeyCharacterMap.get", |env, _activity| {
            let map = match env.call_static_method(
                "android/view/KeyCharacterMap",
                "load",
                "(I)Landroid/view/KeyCharacterMap;",
                &[JValue::Int(device_id)],
            ) {
                Ok(value) => value.l()?,
                Err(jni::errors::Error::JavaException) => {
                    let exception = env.exception_occurred()?;
                    env.exception_clear()?;
                    if env.is_instance_of(
                        &exception,
                        "android/view/KeyCharacterMap$UnavailableException",
                    )? {
                        return Err(TetherError::CharacterMapUnavailable { device_id }.into());
                    }
                    // Re-raise so `call` reports and clears it like any other.
                    env.throw(exception)?;
                    return Err(jni::errors::Error::JavaException.into());
                }
                Err(e) => return Err(e.into()),
            };

            let rune = env
                .call_method(
                    &map,
                    "get",
                    "(II)I",
                    &[JValue::Int(key_code), JValue::Int(meta_state)],
                )?
                .i()?;
            // Dead keys set the COMBINING_ACCENT high bit; keep it intact.
            Ok(rune as u32)
        })
    }
}

// ---------------------------------------------------------------------------
// InputMethod: android.view.inputmethod.InputMethodManager
// ---------------------------------------------------------------------------

impl InputMethod for AndroidHost {
    fn show_soft_input(&self) -> Result<()> {
        self.call("showSoftInput", |env, activity| {
            let imm = input_method_manager(env, activity)?;
            let view = root_view(env, activity)?;
            env.call_method(
                &imm,
                "showSoftInput",
                "(Landroid/view/View;I)Z",
                &[JValue::Object(&view), JValue::Int(0)],
            )?;
            Ok(())
        })
    }

    fn hide_soft_input(&self) -> Result<()> {
        self.call("hideSoftInputFromWindow", |env, activity| {
            let imm = input_method_manager(env, activity)?;
            let view = root_view(env, activity)?;
            let token = env
                .call_method(&view, "getWindowToken", "()Landroid/os/IBinder;", &[])?
                .l()?;
            env.call_method(
                &imm,
                "hideSoftInputFromWindow",
                "(Landroid/os/IBinder;I)Z",
                &[JValue::Object(&token), JValue::Int(0)],
            )?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// DocumentLauncher: Storage Access Framework
// ---------------------------------------------------------------------------

impl DocumentLauncher for AndroidHost {
    /// Dispatch `ACTION_OPEN_DOCUMENT` wrapped in a chooser. The result (a
    /// document URI) arrives through `onActivityResult` with
    /// `request.request_code`.
    fn launch_open_document(&self, request: &OpenDocumentRequest) -> Result<()> {
        tracing::info!(
            request_code = request.request_code,
            mime = %request.mime_type,
            "Android: launching ACTION_OPEN_DOCUMENT"
        );

        self.call("startActivityForResult(OPEN_DOCUMENT)", |env, activity| {
            let j_action = env.new_string("android.intent.action.OPEN_DOCUMENT")?;
            let intent = env.new_object(
                "android/content/Intent",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_action)],
            )?;

            let j_mime = env.new_string(&request.mime_type)?;
            env.call_method(
                &intent,
                "setType",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_mime)],
            )?;

            // intent.addCategory(Intent.CATEGORY_OPENABLE)
            let j_category = env.new_string("android.intent.category.OPENABLE")?;
            env.call_method(
                &intent,
                "addCategory",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_category)],
            )?;

            let j_title = env.new_string(&request.chooser_title)?;
            let chooser = env
                .call_static_method(
                    "android/content/Intent",
                    "createChooser",
                    "(Landroid/content/Intent;Ljava/lang/CharSequence;)Landroid/content/Intent;",
                    &[JValue::Object(&intent), JValue::Object(&j_title)],
                )?
                .l()?;

            env.call_method(
                activity,
                "startActivityForResult",
                "(Landroid/content/Intent;I)V",
                &[JValue::Object(&chooser), JValue::Int(request.request_code)],
            )?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// UiThread: main Looper check, Activity.runOnUiThread via the Java shim
// ---------------------------------------------------------------------------

impl UiThread for AndroidHost {
    fn is_ui_thread(&self) -> bool {
        let on_main = self.call("Looper.myLooper", |env, _activity| {
            let main = env
                .call_static_method("android/os/Looper", "getMainLooper", "()Landroid/os/Looper;", &[])?
                .l()?;
            let mine = env
                .call_static_method("android/os/Looper", "myLooper", "()Landroid/os/Looper;", &[])?
                .l()?;
            Ok(!mine.is_null() && env.is_same_object(&main, &mine)?)
        });
        on_main.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "could not identify the UI thread; posting");
            false
        })
    }

    fn post(&self, task: UiTask) -> Result<()> {
        let raw = Box::into_raw(Box::new(task));
        let posted = self.call("postToUiThread", |env, activity| {
            env.call_method(
                activity,
                "postToUiThread",
                "(J)V",
                &[JValue::Long(raw as jlong)],
            )?;
            Ok(())
        });
        if posted.is_err() {
            // SAFETY: Java rejected the call, so it never ran the task and
            // `raw` is still the only owner.
            drop(unsafe { Box::from_raw(raw) });
        }
        posted
    }
}

// ---------------------------------------------------------------------------
// CacheDirectory: Context.getCacheDir()
// ---------------------------------------------------------------------------

impl CacheDirectory for AndroidHost {
    fn cache_dir(&self) -> Result<PathBuf> {
        self.call("getCacheDir", |env, activity| {
            let dir = env
                .call_method(activity, "getCacheDir", "()Ljava/io/File;", &[])?
                .l()?;
            if dir.is_null() {
                return Err(TetherError::Host("getCacheDir returned null".into()).into());
            }
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
                .l()?;
            let path: String = env.get_string(&JString::from(path))?.into();
            Ok(PathBuf::from(path))
        })
    }
}
