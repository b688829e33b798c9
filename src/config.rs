//! Configuration file
//!
//! ```json
//! {
//!   "aggregations_dir": "./aggregations",
//!   "strict_catalog": false,
//!   "log_pipelines": false,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `aggregations_dir` is required. Relative paths resolve against the
//! directory containing the configuration file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::catalog::CatalogLoader;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of aggregation definitions (required)
    pub aggregations_dir: PathBuf,

    /// Abort catalog loading on the first malformed definition
    #[serde(default)]
    pub strict_catalog: bool,

    /// Log every compiled pipeline at DEBUG
    #[serde(default)]
    pub log_pipelines: bool,

    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Configuration with defaults for everything but the catalog directory
    pub fn new(aggregations_dir: impl Into<PathBuf>) -> Self {
        Self {
            aggregations_dir: aggregations_dir.into(),
            strict_catalog: false,
            log_pipelines: false,
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&content)?;

        if config.aggregations_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.aggregations_dir = base.join(&config.aggregations_dir);
            }
        }

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.aggregations_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "aggregations_dir must not be empty".into(),
            ));
        }

        self.level()?;
        Ok(())
    }

    /// Parsed log level
    pub fn level(&self) -> ConfigResult<Level> {
        Level::from_str(&self.log_level).map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid log_level '{}': expected trace, debug, info, warn or error",
                self.log_level
            ))
        })
    }

    /// Catalog loader for the configured directory
    pub fn catalog_loader(&self) -> CatalogLoader {
        CatalogLoader::new(&self.aggregations_dir).strict(self.strict_catalog)
    }
}
