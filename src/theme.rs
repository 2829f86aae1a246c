//! Light/dark theme preference.
//!
//! A single [`ThemePreference`] is created when the site starts and shared
//! by reference with every consumer (page rendering as the site default, the
//! theme API, the CLI).
//! Consumers read it directly or [`subscribe`](ThemePreference::subscribe) to
//! a `watch` channel; the only writers are [`toggle`](ThemePreference::toggle)
//! and the platform-change listener.
//!
//! ## Initial value
//!
//! 1. A stored preference (`"dark"` / `"light"` under the configured key).
//!    Any non-empty stored value counts as an explicit choice; it means dark
//!    only when it is exactly `"dark"`.
//! 2. Otherwise the platform signal (the OS light/dark setting).
//! 3. Otherwise `fallback_dark` from config.
//!
//! Storage problems never surface: a failed read falls through to the
//! platform signal, a failed write leaves the new value in memory for the
//! rest of the session.
//!
//! ## Style marker
//!
//! When dark, pages put the `dark` class on the root element
//! ([`ThemePreference::root_class`]); the generated CSS keys the dark palette
//! off `:root.dark`.

use crate::config::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("preference storage unavailable")]
    Unavailable,
}

/// The two display modes, stored as their lowercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }

    /// Interpret a stored value. Empty means "nothing stored".
    pub fn from_stored(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self::from_dark(value == "dark"))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub is_dark: bool,
}

impl ThemeState {
    pub fn mode(self) -> ThemeMode {
        ThemeMode::from_dark(self.is_dark)
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Key/value persistence for the preference.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Session-only storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Unavailable)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A small JSON object on disk, one entry per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/lenscraft/preferences.json`, when the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("lenscraft").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut values = self.read_all().unwrap_or_else(|e| {
            tracing::debug!(path = %self.path.display(), error = %e, "discarding unreadable preferences file");
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

// ============================================================================
// Platform signal
// ============================================================================

/// The operating system's light/dark setting.
pub trait PlatformTheme: Send + Sync {
    /// Current setting, or `None` when the platform doesn't say.
    fn prefers_dark(&self) -> Option<bool>;
    /// Stream of later settings, or `None` when changes can't be observed.
    fn changes(&self) -> Option<watch::Receiver<bool>>;
}

/// No platform signal at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatform;

impl PlatformTheme for NoPlatform {
    fn prefers_dark(&self) -> Option<bool> {
        None
    }

    fn changes(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// Desktop setting via `dark-light`. The crate only offers one-shot
/// detection, so changes are picked up by polling.
#[derive(Debug, Clone, Copy)]
pub struct SystemTheme {
    poll: Duration,
}

impl SystemTheme {
    pub fn new(poll: Duration) -> Self {
        Self { poll }
    }
}

fn detect_dark() -> Option<bool> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Some(true),
        Ok(dark_light::Mode::Light) => Some(false),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = ?e, "system theme detection failed");
            None
        }
    }
}

impl PlatformTheme for SystemTheme {
    fn prefers_dark(&self) -> Option<bool> {
        detect_dark()
    }

    fn changes(&self) -> Option<watch::Receiver<bool>> {
        if self.poll.is_zero() {
            return None;
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let (tx, rx) = watch::channel(detect_dark().unwrap_or_default());
        let poll = self.poll;

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = tokio::time::sleep(poll) => {}
                }
                let detected = tokio::task::spawn_blocking(detect_dark)
                    .await
                    .ok()
                    .flatten();
                if let Some(dark) = detected {
                    tx.send_if_modified(|current| {
                        let changed = *current != dark;
                        *current = dark;
                        changed
                    });
                }
            }
        });
        Some(rx)
    }
}

// ============================================================================
// Preference
// ============================================================================

struct Inner {
    key: String,
    store: Arc<dyn PreferenceStore>,
    state: watch::Sender<ThemeState>,
    /// A stored choice was found at startup, or the user toggled in this
    /// session (even if the write failed). Platform changes consult this
    /// flag, never the store.
    overridden: AtomicBool,
}

impl Inner {
    fn has_override(&self) -> bool {
        self.overridden.load(Ordering::Acquire)
    }

    fn apply_platform(&self, is_dark: bool) -> bool {
        if self.has_override() {
            tracing::debug!(is_dark, "platform theme changed, user choice takes precedence");
            return false;
        }
        let changed = self.state.send_if_modified(|state| {
            let changed = state.is_dark != is_dark;
            state.is_dark = is_dark;
            changed
        });
        if changed {
            tracing::info!(theme = %ThemeMode::from_dark(is_dark), "following platform theme");
        }
        changed
    }
}

/// Shared light/dark preference. See the module docs.
pub struct ThemePreference {
    inner: Arc<Inner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ThemePreference {
    pub fn init(
        key: impl Into<String>,
        store: Arc<dyn PreferenceStore>,
        platform: &dyn PlatformTheme,
        fallback_dark: bool,
    ) -> Self {
        let key = key.into();
        let stored = match store.load(&key) {
            Ok(value) => value.as_deref().and_then(ThemeMode::from_stored),
            Err(e) => {
                tracing::warn!(error = %e, "theme preference unreadable, using session default");
                None
            }
        };

        let is_dark = match stored {
            Some(mode) => {
                tracing::debug!(theme = %mode, "using stored theme preference");
                mode.is_dark()
            }
            None => match platform.prefers_dark() {
                Some(dark) => {
                    tracing::debug!(is_dark = dark, "using platform theme");
                    dark
                }
                None => fallback_dark,
            },
        };

        let (state, _) = watch::channel(ThemeState { is_dark });
        Self {
            inner: Arc::new(Inner {
                key,
                store,
                state,
                overridden: AtomicBool::new(stored.is_some()),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Current flag.
    pub fn read(&self) -> bool {
        self.inner.state.borrow().is_dark
    }

    pub fn state(&self) -> ThemeState {
        *self.inner.state.borrow()
    }

    pub fn mode(&self) -> ThemeMode {
        self.state().mode()
    }

    /// Class for the document root: `Some("dark")` in dark mode.
    pub fn root_class(&self) -> Option<&'static str> {
        self.read().then_some("dark")
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.inner.state.subscribe()
    }

    /// Whether the user has made an explicit choice (stored or this session).
    pub fn has_override(&self) -> bool {
        self.inner.has_override()
    }

    /// Flip the flag and write it back. Returns the new flag.
    ///
    /// The write happens on the calling thread; async callers run this on the
    /// blocking pool.
    pub fn toggle(&self) -> bool {
        let mut is_dark = false;
        self.inner.state.send_modify(|state| {
            state.is_dark = !state.is_dark;
            is_dark = state.is_dark;
        });
        self.inner.overridden.store(true, Ordering::Release);

        let mode = ThemeMode::from_dark(is_dark);
        if let Err(e) = self.inner.store.save(&self.inner.key, mode.as_str()) {
            tracing::warn!(error = %e, "could not persist theme preference, keeping it for this session");
        }
        tracing::info!(theme = %mode, "theme toggled");
        is_dark
    }

    /// Follow later platform changes while no explicit choice exists.
    ///
    /// Returns `false` when the platform offers no change signal or no Tokio
    /// runtime is available; the preference then simply stays put.
    pub fn attach_platform(&self, platform: &dyn PlatformTheme) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return false;
        };
        let Some(mut changes) = platform.changes() else {
            tracing::debug!("no platform theme signal, not listening");
            return false;
        };

        self.detach_platform();
        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            while changes.changed().await.is_ok() {
                let is_dark = *changes.borrow_and_update();
                inner.apply_platform(is_dark);
            }
        });
        if let Ok(mut listener) = self.listener.lock() {
            *listener = Some(handle);
        }
        true
    }

    pub fn detach_platform(&self) {
        let handle = match self.listener.lock() {
            Ok(mut listener) => listener.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for ThemePreference {
    fn drop(&mut self) {
        self.detach_platform();
    }
}

/// Preference store named by config. A relative `store_path` is taken from
/// the site directory; with no path and no per-user data directory the
/// preference only lives in memory.
pub fn open_store(config: &ThemeConfig, site_dir: &Path) -> Arc<dyn PreferenceStore> {
    let path = match &config.store_path {
        Some(path) => Some(site_dir.join(path)),
        None => FileStore::default_path(),
    };
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "theme preference file");
            Arc::new(FileStore::new(path))
        }
        None => {
            tracing::warn!("no data directory for theme preference, it will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Initialize the preference from config.
pub fn open(config: &ThemeConfig, site_dir: &Path, platform: &dyn PlatformTheme) -> ThemePreference {
    ThemePreference::init(
        config.storage_key.clone(),
        open_store(config, site_dir),
        platform,
        config.fallback_dark,
    )
}
