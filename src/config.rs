//! Configuration loading for tinytalk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the tinytalk home directory (~/.tinytalk).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".tinytalk"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.tinytalk/settings.json
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}. Run 'tinytalk setup <base_url>' first.",
            path.display()
        )));
    }

    load_settings_from(&path)
}

/// Load settings from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings to ~/.tinytalk/settings.json
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = get_settings_path()?;
    save_settings_to(settings, &path)
}

/// Save settings to an explicit path.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(settings)?)?;

    tracing::debug!("Saved settings to {}", path.display());
    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<()> {
    let url = settings.backend.base_url.trim();
    if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "backend.base_url must start with http:// or https://, got '{}'",
            url
        )));
    }
    if settings.session.token.is_some() && url.is_empty() {
        return Err(Error::Config(
            "session token present but backend.base_url is empty".to_string(),
        ));
    }
    Ok(())
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Backend endpoint configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Cached auth session state.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SessionConfig {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

/// Roster refresh configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_inbox_limit")]
    pub inbox_limit: usize,
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_inbox_limit() -> usize {
    200
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            inbox_limit: default_inbox_limit(),
        }
    }
}

/// tinytalk settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}
