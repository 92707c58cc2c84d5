use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{cache::DEFAULT_TTL_MINUTES, engine::DEFAULT_SUGGESTION_COUNT};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// weather_api_key = "..."
/// catalog_path = "/home/me/wardrobe.json"
/// suggestion_count = 8
/// cache_ttl_minutes = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// WeatherAPI.com key.
    pub weather_api_key: Option<String>,

    /// JSON catalog to use instead of the bundled one.
    pub catalog_path: Option<PathBuf>,

    pub suggestion_count: Option<usize>,

    pub cache_ttl_minutes: Option<i64>,
}

impl Config {
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather_api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No weather API key configured.\n\
                 Hint: run `outfit configure` and enter your WeatherAPI.com key, \
                 or pass --temperature to skip the lookup."
            )
        })
    }

    /// Configured number of suggestions, or the engine default. Zero is
    /// treated as unset.
    pub fn effective_count(&self) -> usize {
        self.suggestion_count.filter(|n| *n > 0).unwrap_or(DEFAULT_SUGGESTION_COUNT)
    }

    /// How long a cached reading stays fresh. Errors when
    /// `cache_ttl_minutes` is too large to represent.
    pub fn cache_ttl(&self) -> Result<Duration> {
        let minutes = self.cache_ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES);
        Duration::try_minutes(minutes).ok_or_else(|| {
            anyhow!("cache_ttl_minutes = {minutes} is out of range; use a smaller number of minutes")
        })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        load_toml(path, "config")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        save_toml(self, path, "config")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "outfit-suggest", "outfit")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

/// Read a TOML file, or return `T::default()` on first run.
pub(crate) fn load_toml<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
}

pub(crate) fn save_toml<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {what} directory: {}", parent.display()))?;
    }

    let toml = toml::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {what} to TOML"))?;

    fs::write(path, toml).with_context(|| format!("Failed to write {what} file: {}", path.display()))
}
