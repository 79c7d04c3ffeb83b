//! Configuration management for seniorconnect.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matching::MatchStrategy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "seniorconnect";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "seniorconnect.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SENIORCONNECT_`, sections
///    separated by `__`, e.g. `SENIORCONNECT_CALLS__END_TIMEOUT_MS`)
/// 2. TOML config file at `~/.config/seniorconnect/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Call lifecycle configuration.
    pub calls: CallConfig,
    /// Volunteer matching configuration.
    pub matching: MatchingConfig,
    /// Volunteer directory configuration.
    pub directory: DirectoryConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/seniorconnect/seniorconnect.db`
    pub database_path: Option<PathBuf>,
}

/// Call lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Name shown by the telephony provider for calls placed by the app.
    pub app_name: String,
    /// How long a call may take to go from requested to connected.
    pub start_timeout_ms: u64,
    /// How long an end request may go unconfirmed.
    pub end_timeout_ms: u64,
}

/// Volunteer matching configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Which lookup picks the volunteer to call.
    pub strategy: MatchStrategy,
}

/// Volunteer directory configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Seed the sample volunteers when the directory loads empty.
    pub seed_sample_volunteers: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            app_name: "SeniorConnect".to_string(),
            start_timeout_ms: 30_000,
            end_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SENIORCONNECT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.calls.start_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "start_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.calls.end_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "end_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.calls.app_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "app_name must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Deadline for a call to become active after it was requested.
    #[must_use]
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.calls.start_timeout_ms)
    }

    /// Deadline for an end request to be confirmed.
    #[must_use]
    pub fn end_timeout(&self) -> Duration {
        Duration::from_millis(self.calls.end_timeout_ms)
    }
}
