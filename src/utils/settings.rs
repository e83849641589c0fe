//! Settings file fallback for credential environment variables.
//!
//! `$HOME/.gitlab-mr/settings.json` may carry an `env` map, consulted when
//! a variable is unset or blank in the process environment.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Contents of `$HOME/.gitlab-mr/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Values for environment variables that are not set.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads the settings file from the home directory.
    pub fn load() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Self::load_from_path(settings_path(&home_dir))
    }

    /// Loads settings from `path`; a missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }
}

fn settings_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".gitlab-mr").join("settings.json")
}

/// Returns an environment variable with fallback to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    lookup_env(key, Settings::load)
}

/// Reads `key` from the environment, then from the settings `load` returns.
///
/// `load` only runs when the environment has no usable value.
fn lookup_env(key: &str, load: impl FnOnce() -> Result<Settings>) -> Result<String> {
    if let Ok(value) = env::var(key) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }

    match load() {
        Ok(settings) => settings
            .env
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("Environment variable not found: {key}")),
        Err(err) => Err(err.context(format!("Environment variable not found: {key}"))),
    }
}
