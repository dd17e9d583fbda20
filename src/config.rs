//! Persisted settings
//!
//! Stored as JSON under the user config directory. Missing files and
//! missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::context::DEFAULT_TOKEN_BUDGET;
use crate::documents::ingest::DEFAULT_PROMPT;

/// Directory name under the platform config dir
const APP_DIR: &str = "excerpt";
const SETTINGS_FILE: &str = "settings.json";

/// Overrides `token_budget` when set
pub const TOKEN_BUDGET_ENV: &str = "EXCERPT_TOKEN_BUDGET";

/// Maximum upload size (50 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoConfigDir,
    #[error("Invalid token budget: {0}")]
    InvalidTokenBudget(String),
}

impl Serialize for ConfigError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Token budget for the sampled document text
    pub token_budget: u32,
    /// Sent after the document when the user asked nothing
    pub default_prompt: String,
    pub max_file_size_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            default_prompt: DEFAULT_PROMPT.to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Settings {
    /// Apply a raw `EXCERPT_TOKEN_BUDGET` value
    pub fn with_token_budget_override(mut self, raw: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = raw {
            self.token_budget = parse_token_budget(raw)?;
        }
        Ok(self)
    }
}

pub fn parse_token_budget(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(tokens) if tokens > 0 => Ok(tokens),
        _ => Err(ConfigError::InvalidTokenBudget(raw.to_string())),
    }
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Load from `path`; a missing file yields defaults
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    atomic_write(path, &content)
}

/// Settings file plus environment override
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = load_settings_from(&settings_path()?)?;
    let env_budget = std::env::var(TOKEN_BUDGET_ENV).ok();
    let settings = settings.with_token_budget_override(env_budget.as_deref())?;
    tracing::debug!(token_budget = settings.token_budget, "Loaded settings");
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    let path = settings_path()?;
    save_settings_to(&path, settings)?;
    tracing::info!(path = %path.display(), "Saved settings");
    Ok(path)
}

/// Write to a .tmp sibling then rename into place.
fn atomic_write(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.token_budget, 4000);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            token_budget: 1500,
            ..Settings::default()
        };
        save_settings_to(&path, &settings).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"tokenBudget": 900}"#).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.token_budget, 900);
        assert_eq!(settings.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_token_budget_override() {
        let settings = Settings::default().with_token_budget_override(Some(" 2500 ")).unwrap();
        assert_eq!(settings.token_budget, 2500);
        let settings = Settings::default().with_token_budget_override(None).unwrap();
        assert_eq!(settings.token_budget, DEFAULT_TOKEN_BUDGET);
        assert!(Settings::default().with_token_budget_override(Some("0")).is_err());
        assert!(Settings::default().with_token_budget_override(Some("lots")).is_err());
    }
}
