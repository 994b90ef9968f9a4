use crate::common::xdg;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Tool settings, read from `config.toml` in the XDG config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Ecosystem file lookup
    pub ecosystem: EcosystemConfig,
    /// Terminal output
    pub output: OutputConfig,
    /// Diagnostic logging
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemConfig {
    /// Top-level key holding the list of process descriptors
    pub apps_key: String,
    /// File names tried, in order, when no file is given on the command line
    pub default_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colorize terminal output
    pub color: bool,
    /// Show a rendered sample of each log date format
    pub date_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for procspec's own diagnostics (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            apps_key: crate::ecosystem::DEFAULT_APPS_KEY.to_string(),
            default_files: vec![
                "ecosystem.config.json".to_string(),
                "ecosystem.config.toml".to_string(),
                "ecosystem.json".to_string(),
                "ecosystem.toml".to_string(),
                "ecosystem.config.js".to_string(),
                "ecosystem.config.cjs".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            date_preview: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn get_config_file_path() -> PathBuf {
        xdg::get_config_file()
    }

    /// Load settings from the XDG location, or defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded settings from {:?}", path);
        Ok(config)
    }
}
