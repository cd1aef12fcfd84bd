//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/noac/config.toml`. Only
//! storage and logging behaviour is configurable; the dosing rules are not.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub outcome_log: OutcomeLogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Outcome log configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutcomeLogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// File name inside the data directory
    #[serde(default = "default_log_file")]
    pub file_name: String,
}

impl Default for OutcomeLogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            file_name: default_log_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("noac")
}

fn default_enabled() -> bool {
    true
}

fn default_log_file() -> String {
    "outcomes.jsonl".to_string()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            path => {
                tracing::info!("No config file found at {:?}, using defaults", path);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("noac").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the outcome log under `data_dir`
    pub fn outcome_log_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.outcome_log.file_name)
    }

    fn validate(&self) -> Result<()> {
        let name = self.outcome_log.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(Error::Config(format!(
                "outcome_log.file_name must be a plain file name, got {:?}",
                self.outcome_log.file_name
            )));
        }
        Ok(())
    }
}
