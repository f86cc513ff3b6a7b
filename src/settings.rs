//! Persisted user settings
//!
//! Stored as JSON, e.g. `{"enabled": true, "confirmBeforeUpdate": false}`.
//! Missing fields (or a missing file) fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Feature switches consulted once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Master kill-switch. When off, change notifications are ignored.
    pub enabled: bool,
    /// Ask before writing to a target document.
    pub confirm_before_update: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            confirm_before_update: false,
        }
    }
}

impl SyncSettings {
    /// Load settings from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw + "\n")?;
        Ok(())
    }

    /// Default location (`<data dir>/supersede/settings.json`).
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
        data_dir.join("supersede").join("settings.json")
    }
}

/// Source of the settings for one evaluation.
pub trait SettingsSource: Send + Sync {
    fn settings(&self) -> SyncSettings;
}

impl SettingsSource for SyncSettings {
    fn settings(&self) -> SyncSettings {
        *self
    }
}

/// Settings that can change while evaluations are running.
///
/// Each evaluation takes a snapshot when it starts; later changes apply to
/// the next trigger.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<SyncSettings>>,
}

impl SharedSettings {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut SyncSettings)) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}

impl SettingsSource for SharedSettings {
    fn settings(&self) -> SyncSettings {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
