//! Configuration for where and under which key the workspace is persisted.
//!
//! Stored as a JSON file at an OS-appropriate location.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence key the app has always stored its workspace under.
pub const DEFAULT_PERSIST_KEY: &str = "rmbr-workspace";

/// Persisted store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    /// SQLite file holding persisted snapshots.
    pub storage_path: String,
    /// Key the workspace snapshot is stored under.
    pub persist_key: String,
    /// Sidebar state for a workspace with no saved snapshot.
    pub sidebar_open_by_default: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path().to_string_lossy().to_string(),
            persist_key: DEFAULT_PERSIST_KEY.to_string(),
            sidebar_open_by_default: true,
        }
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/rmbr/settings.json`
/// - Windows: `%APPDATA%/rmbr/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("rmbr").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("rmbr").join("settings.json")
    }
}

/// Returns the default snapshot store: `<data dir>/rmbr/workspace.db`.
pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("rmbr")
        .join("workspace.db")
}

/// Loads settings from the default location; returns defaults if missing or corrupt.
pub fn load_settings() -> StoreSettings {
    load_settings_from(settings_file_path())
}

/// Loads settings from `path`; returns defaults if missing or corrupt.
pub fn load_settings_from<P: AsRef<Path>>(path: P) -> StoreSettings {
    match fs::read_to_string(path.as_ref()) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring corrupt settings file {}: {e}",
                path.as_ref().display()
            );
            StoreSettings::default()
        }),
        Err(_) => StoreSettings::default(),
    }
}

/// Saves settings to the default location, creating parent directories as needed.
pub fn save_settings(settings: &StoreSettings) -> Result<()> {
    save_settings_to(settings_file_path(), settings)
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to<P: AsRef<Path>>(path: P, settings: &StoreSettings) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
