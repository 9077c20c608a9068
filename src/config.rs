use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Directory holding one file per key when `backend` is `file`
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Goal given to a fresh water record when no earlier day exists
    #[serde(default = "default_water_goal")]
    pub default_water_goal: u32,
    /// Insert the demo account when the user directory is empty
    #[serde(default = "default_true")]
    pub seed_demo_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_storage_path() -> String {
    "./data".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_water_goal() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "healthlog=info,warp=warn".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_water_goal: default_water_goal(),
            seed_demo_user: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.default_water_goal == 0 {
            return Err(ConfigError::Invalid(
                "tracking.default_water_goal must be at least 1".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::File && self.storage.path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, path)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

fn parse_config(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
