use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "lyricpick";
const SETTINGS_FILE: &str = "settings.json";
const CONFIG_DIR_ENV: &str = "LYRICPICK_CONFIG_DIR";
const LASTFM_KEY_ENV: &str = "LYRICPICK_LASTFM_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub editor: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub parallel_sources: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            editor: None,
            lastfm_api_key: None,
            request_timeout_secs: 15,
            user_agent: format!("{APP_DIR}/{}", env!("CARGO_PKG_VERSION")),
            parallel_sources: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Applies environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = env::var(LASTFM_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.lastfm_api_key = Some(key.trim().to_string());
        }
        self
    }
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default().with_env_overrides());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings.with_env_overrides())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    let path = root.join(SETTINGS_FILE);
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
