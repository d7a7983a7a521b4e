// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridge object: host lifecycle in, native events out, native commands
// dispatched to the host.
//
// Lifecycle callbacks arrive on the host UI thread. Commands may come from the
// native loop's thread; those touching views or the activity are posted to
// the UI thread, while rune and cache-directory queries answer in place.

use std::sync::{Arc, Mutex, PoisonError};

use tether_core::config::BridgeConfig;
use tether_core::error::{Result, TetherError};
use tether_core::types::{LibraryStatus, NativeEvent, ResultDisposition};

use crate::file_picker::FilePicker;
use crate::traits::{ComponentMetadata, EventSink, Host};
use crate::{insets, keyboard, keys, library};

/// Metadata key that may carry a JSON [`BridgeConfig`].
pub const CONFIG_METADATA_KEY: &str = "tether.config";

/// Read the bridge configuration from component metadata.
///
/// Absent metadata or an absent key yields the defaults. Invalid JSON and
/// host failures are returned.
pub fn config_from_metadata<M>(metadata: &M) -> Result<BridgeConfig>
where
    M: ComponentMetadata + ?Sized,
{
    match metadata.metadata_string(CONFIG_METADATA_KEY) {
        Ok(Some(json)) => BridgeConfig::from_json_str(&json),
        Ok(None) | Err(TetherError::MissingMetadata) => Ok(BridgeConfig::default()),
        Err(e) => Err(e),
    }
}

/// The config from [`config_from_metadata`], or the defaults with the
/// failure logged.
pub fn config_or_default(loaded: Result<BridgeConfig>) -> BridgeConfig {
    match loaded {
        Ok(config) => config,
        Err(e) if e.is_configuration() => {
            tracing::warn!(error = %e, "invalid bridge config in metadata; using defaults");
            BridgeConfig::default()
        }
        Err(e) => {
            tracing::error!(error = %e, "could not read bridge config from metadata; using defaults");
            BridgeConfig::default()
        }
    }
}

struct Shared {
    config: BridgeConfig,
    host: Box<dyn Host>,
    picker: FilePicker,
    library: Mutex<LibraryStatus>,
    native: Mutex<Option<Arc<dyn EventSink>>>,
}

impl Shared {
    fn emit(&self, event: NativeEvent) {
        let native = self
            .native
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match native {
            Some(native) => native.deliver(event),
            None => tracing::debug!(?event, "native library not loaded; dropping event"),
        }
    }

    fn launch_picker(&self) {
        self.picker.launch(self.host.as_ref(), |path| {
            self.emit(NativeEvent::FilePickerReturned(path))
        });
    }
}

/// Bridge between one host activity and the native application loop.
///
/// Cloning yields another handle to the same bridge. Host callbacks (`on_*`)
/// and native commands may arrive on different threads.
#[derive(Clone)]
pub struct Bridge {
    shared: Arc<Shared>,
}

impl Bridge {
    pub fn new(config: BridgeConfig, host: Box<dyn Host>) -> Self {
        let picker = FilePicker::new(&config);
        Self {
            shared: Arc::new(Shared {
                config,
                host,
                picker,
                library: Mutex::new(LibraryStatus::Pending),
                native: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    pub fn platform_name(&self) -> &str {
        self.shared.host.platform_name()
    }

    pub fn library_status(&self) -> LibraryStatus {
        self.shared
            .library
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `self` and `other` are handles to the same bridge.
    pub fn ptr_eq(&self, other: &Bridge) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    // -- Host lifecycle --------------------------------------------------------

    /// Activity creation, before the host's own `onCreate` runs: load the
    /// native library named in metadata and bind its entry points. Never
    /// fails.
    pub fn on_create(&self) -> LibraryStatus {
        let shared = &self.shared;
        let status = match library::load(shared.host.as_ref(), &shared.config.library_metadata_key)
        {
            Ok(native) => {
                *shared.native.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::from(native.entry_points));
                LibraryStatus::Loaded(native.library)
            }
            Err(e) => LibraryStatus::Failed(e.to_string()),
        };
        *shared.library.lock().unwrap_or_else(PoisonError::into_inner) = status.clone();
        status
    }

    /// After the host's `onCreate`: start observing root view layout.
    pub fn on_post_create(&self) {
        match self.shared.host.observe_layout() {
            Ok(()) => tracing::debug!("layout observer registered"),
            Err(e) => tracing::warn!(error = %e, "could not observe root view layout"),
        }
    }

    /// Root view layout changed.
    pub fn on_layout_change(&self) {
        let shared = &self.shared;
        if let Some((insets, strategy)) =
            insets::compute(shared.host.as_ref(), shared.config.root_insets_min_api)
        {
            tracing::trace!(?insets, ?strategy, "insets changed");
            shared.emit(NativeEvent::InsetsChanged { insets, strategy });
        }
    }

    /// Activity result from the host. Only the picker's request code is handled.
    pub fn on_activity_result(
        &self,
        request_code: i32,
        result_code: i32,
        data_path: Option<String>,
    ) -> ResultDisposition {
        let shared = &self.shared;
        shared
            .picker
            .on_activity_result(request_code, result_code, data_path, |path| {
                shared.emit(NativeEvent::FilePickerReturned(path))
            })
    }

    // -- Native commands -------------------------------------------------------

    pub fn show_keyboard(&self) {
        let ran = self.on_ui_thread(|shared| keyboard::show(shared.host.as_ref()));
        if let Err(e) = ran {
            tracing::warn!(error = %e, "could not post showKeyboard to the UI thread");
        }
    }

    pub fn hide_keyboard(&self) {
        let ran = self.on_ui_thread(|shared| keyboard::hide(shared.host.as_ref()));
        if let Err(e) = ran {
            tracing::warn!(error = %e, "could not post hideKeyboard to the UI thread");
        }
    }

    /// Open the document picker. The result arrives later as
    /// [`NativeEvent::FilePickerReturned`].
    ///
    /// Only `PickerBusy` is reported; every other failure resolves the
    /// request with an empty path.
    pub fn show_file_open(&self) -> Result<()> {
        self.shared.picker.begin()?;
        if let Err(e) = self.on_ui_thread(Shared::launch_picker) {
            let shared = &self.shared;
            shared
                .picker
                .abandon(&e, |path| shared.emit(NativeEvent::FilePickerReturned(path)));
        }
        Ok(())
    }

    /// Code point for a key press, or [`tether_core::NO_RUNE`].
    pub fn get_rune(&self, device_id: i32, key_code: i32, meta_state: i32) -> i32 {
        keys::get_rune(self.shared.host.as_ref(), device_id, key_code, meta_state)
    }

    /// Host cache directory for scratch files; empty if unavailable.
    pub fn tmp_dir(&self) -> String {
        match self.shared.host.cache_dir() {
            Ok(dir) => dir.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "cache directory unavailable");
                String::new()
            }
        }
    }

    /// Run `f` now if this is the UI thread, else post it there.
    fn on_ui_thread(&self, f: impl FnOnce(&Shared) + Send + 'static) -> Result<()> {
        if self.shared.host.is_ui_thread() {
            f(&self.shared);
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        self.shared.host.post(Box::new(move || f(&shared)))
    }
}
