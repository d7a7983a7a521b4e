// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scriptable host and log capture shared by the unit tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};
use tether_core::error::{Result, TetherError};
use tether_core::types::{Insets, NativeEvent, Rect, Size};

use crate::traits::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImeCall {
    Show,
    Hide,
}

#[derive(Default)]
struct CallLog {
    loaded: Vec<String>,
    ime: Vec<ImeCall>,
    launched: Vec<OpenDocumentRequest>,
    observe_calls: usize,
    bound: usize,
}

impl EventSink for Sender<NativeEvent> {
    fn deliver(&self, event: NativeEvent) {
        if self.send(event).is_err() {
            tracing::debug!("native event receiver dropped; event discarded");
        }
    }
}

/// In-memory host. Clones share the call log, so a test can box one clone
/// into a bridge and inspect another.
#[derive(Clone)]
pub struct FakeHost {
    metadata: Option<HashMap<String, String>>,
    fail_metadata_reads: bool,
    fail_library_load: bool,
    api_level: u32,
    window_insets: Option<Insets>,
    frames: Option<(Rect, Size)>,
    characters: HashMap<(i32, i32, i32), u32>,
    unavailable_devices: Vec<i32>,
    root_view_attached: bool,
    fail_launches: bool,
    cache_dir: Option<PathBuf>,
    ui_queue: Option<Arc<Mutex<Vec<UiTask>>>>,
    fail_posts: bool,
    native: (Sender<NativeEvent>, Receiver<NativeEvent>),
    log: Arc<Mutex<CallLog>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            metadata: Some(HashMap::new()),
            fail_metadata_reads: false,
            fail_library_load: false,
            api_level: 30,
            window_insets: None,
            frames: None,
            characters: HashMap::new(),
            unavailable_devices: Vec::new(),
            root_view_attached: true,
            fail_launches: false,
            cache_dir: None,
            ui_queue: None,
            fail_posts: false,
            native: crossbeam_channel::unbounded(),
            log: Arc::default(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    pub fn failing_metadata_reads(mut self) -> Self {
        self.fail_metadata_reads = true;
        self
    }

    pub fn failing_library_load(mut self) -> Self {
        self.fail_library_load = true;
        self
    }

    pub fn with_api_level(mut self, level: u32) -> Self {
        self.api_level = level;
        self
    }

    pub fn with_window_insets(mut self, insets: Insets) -> Self {
        self.window_insets = Some(insets);
        self
    }

    pub fn with_frames(mut self, visible: Rect, root: Size) -> Self {
        self.frames = Some((visible, root));
        self
    }

    pub fn with_character(mut self, device: i32, key: i32, meta: i32, rune: u32) -> Self {
        self.characters.insert((device, key, meta), rune);
        self
    }

    pub fn with_unavailable_device(mut self, device: i32) -> Self {
        self.unavailable_devices.push(device);
        self
    }

    pub fn without_root_view(mut self) -> Self {
        self.root_view_attached = false;
        self
    }

    pub fn failing_launches(mut self) -> Self {
        self.fail_launches = true;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Treat every caller as off the UI thread: posted tasks wait for
    /// [`run_ui_tasks`](Self::run_ui_tasks).
    pub fn with_ui_queue(mut self) -> Self {
        self.ui_queue = Some(Arc::default());
        self
    }

    pub fn failing_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    /// Events the bridge delivered through the entry points of the loaded
    /// library.
    pub fn native_events(&self) -> Receiver<NativeEvent> {
        self.native.1.clone()
    }

    /// Run queued UI tasks, returning how many ran.
    pub fn run_ui_tasks(&self) -> usize {
        let Some(queue) = &self.ui_queue else {
            return 0;
        };
        let tasks: Vec<UiTask> = queue.lock().expect("ui queue poisoned").drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn bound_entry_points(&self) -> usize {
        self.calls().bound
    }

    pub fn loaded_libraries(&self) -> Vec<String> {
        self.calls().loaded.clone()
    }

    pub fn ime_calls(&self) -> Vec<ImeCall> {
        self.calls().ime.clone()
    }

    pub fn launched_requests(&self) -> Vec<OpenDocumentRequest> {
        self.calls().launched.clone()
    }

    pub fn observe_calls(&self) -> usize {
        self.calls().observe_calls
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, CallLog> {
        self.log.lock().expect("call log poisoned")
    }
}

impl Host for FakeHost {
    fn platform_name(&self) -> &str {
        "Fake"
    }
}

impl ComponentMetadata for FakeHost {
    fn metadata_string(&self, key: &str) -> Result<Option<String>> {
        if self.fail_metadata_reads {
            return Err(TetherError::Host("getActivityInfo.metaData: JavaException".into()));
        }
        let bundle = self.metadata.as_ref().ok_or(TetherError::MissingMetadata)?;
        Ok(bundle.get(key).cloned())
    }
}

impl LibraryLoader for FakeHost {
    fn load_library(&self, name: &str) -> Result<Box<dyn EventSink>> {
        if self.fail_library_load {
            return Err(TetherError::Host(format!(
                "dlopen failed: library \"lib{name}.so\" not found"
            )));
        }
        let mut calls = self.calls();
        calls.loaded.push(name.into());
        calls.bound += 1;
        Ok(Box::new(self.native.0.clone()))
    }
}

impl LayoutObserver for FakeHost {
    fn observe_layout(&self) -> Result<()> {
        self.calls().observe_calls += 1;
        if self.root_view_attached {
            Ok(())
        } else {
            Err(TetherError::NoRootView)
        }
    }
}

impl WindowGeometry for FakeHost {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn root_window_insets(&self) -> Result<Option<Insets>> {
        Ok(self.window_insets)
    }

    fn visible_display_frame(&self) -> Result<Rect> {
        self.frames
            .map(|(visible, _)| visible)
            .ok_or_else(|| TetherError::Host("getWindowVisibleDisplayFrame".into()))
    }

    fn root_view_size(&self) -> Result<Size> {
        self.frames
            .map(|(_, root)| root)
            .ok_or(TetherError::NoRootView)
    }
}

impl CharacterMaps for FakeHost {
    fn character(&self, device_id: i32, key_code: i32, meta_state: i32) -> Result<u32> {
        if self.unavailable_devices.contains(&device_id) {
            return Err(TetherError::CharacterMapUnavailable { device_id });
        }
        self.characters
            .get(&(device_id, key_code, meta_state))
            .copied()
            .ok_or_else(|| TetherError::Host("KeyCharacterMap.get threw".into()))
    }
}

impl InputMethod for FakeHost {
    fn show_soft_input(&self) -> Result<()> {
        self.calls().ime.push(ImeCall::Show);
        self.root_view_result()
    }

    fn hide_soft_input(&self) -> Result<()> {
        self.calls().ime.push(ImeCall::Hide);
        self.root_view_result()
    }
}

impl FakeHost {
    fn root_view_result(&self) -> Result<()> {
        if self.root_view_attached {
            Ok(())
        } else {
            Err(TetherError::NoRootView)
        }
    }
}

impl DocumentLauncher for FakeHost {
    fn launch_open_document(&self, request: &OpenDocumentRequest) -> Result<()> {
        if self.fail_launches {
            return Err(TetherError::Host("no activity handles OPEN_DOCUMENT".into()));
        }
        self.calls().launched.push(request.clone());
        Ok(())
    }
}

impl UiThread for FakeHost {
    fn is_ui_thread(&self) -> bool {
        self.ui_queue.is_none()
    }

    fn post(&self, task: UiTask) -> Result<()> {
        if self.fail_posts {
            return Err(TetherError::Host("postToUiThread: activity finishing".into()));
        }
        match &self.ui_queue {
            Some(queue) => queue.lock().expect("ui queue poisoned").push(task),
            None => task(),
        }
        Ok(())
    }
}

impl CacheDirectory for FakeHost {
    fn cache_dir(&self) -> Result<PathBuf> {
        self.cache_dir.clone().ok_or(TetherError::PlatformUnavailable)
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().expect("log buffer poisoned")).into_owned();
    (out, logs)
}
