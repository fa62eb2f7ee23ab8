//! Configuration loading for the aclsync command-line tool.
//!
//! All fields are required unless explicitly marked optional. The only
//! default is `page_size`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Base URL of the query service, e.g. `https://queries.example.com`.
    pub base_url: String,
    pub api_key: String,
    /// Groups to reconcile, in order.
    pub group_ids: Vec<i64>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub request_timeout_ms: u64,
    /// SQLite file holding the access cache. Created on first run.
    pub cache_path: PathBuf,
}

fn default_page_size() -> u32 {
    aclsync_engine::DEFAULT_PAGE_SIZE
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or ACLSYNC_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.group_ids.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "group_ids",
                reason: "must list at least one group".to_string(),
            });
        }
        if self.group_ids.iter().any(|id| *id <= 0) {
            return Err(ConfigError::InvalidValue {
                field: "group_ids",
                reason: "group ids must be positive".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be > 0".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("ACLSYNC_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
