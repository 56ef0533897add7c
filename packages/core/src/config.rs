//! Runtime configuration
//!
//! `NetGraphConfig` is read once at startup from an optional JSON file, then
//! environment overrides are applied, then the result is validated. Every field has
//! a default so an empty or missing file is a valid configuration.
//!
//! # Environment Variables
//!
//! - `NETGRAPH_PORT`: HTTP port
//! - `NETGRAPH_STORE_BACKEND`: `memory` or `json_file`
//! - `NETGRAPH_STORE_PATH`: Path of the JSON store file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STORE_FILE: &str = "nodes.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which `NodeStore` implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    #[default]
    JsonFile,
}

/// Store selection and location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Store file for the `json_file` backend. Defaults to
    /// `~/.netgraph/database/nodes.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Get the store file path, falling back to the per-user data directory.
    pub fn resolve_path(&self) -> Result<PathBuf, std::io::Error> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let home_dir = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine home directory",
            )
        })?;

        Ok(home_dir
            .join(".netgraph")
            .join("database")
            .join(DEFAULT_STORE_FILE))
    }
}

/// Top-level configuration for the NetGraph server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetGraphConfig {
    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for NetGraphConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_filter: default_log_filter(),
            storage: StorageConfig::default(),
        }
    }
}

impl NetGraphConfig {
    /// Load configuration from `path` (if any), apply environment overrides and
    /// validate.
    ///
    /// A path that does not exist yields the defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `NETGRAPH_*` overrides read through `lookup`.
    ///
    /// Taking a lookup function keeps tests independent of the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("NETGRAPH_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("NETGRAPH_PORT is not a port: {}", port))
            })?;
        }

        if let Some(backend) = lookup("NETGRAPH_STORE_BACKEND") {
            self.storage.backend = match backend.trim() {
                "memory" => StorageBackend::Memory,
                "json_file" => StorageBackend::JsonFile,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "NETGRAPH_STORE_BACKEND must be 'memory' or 'json_file', got '{}'",
                        other
                    )))
                }
            };
        }

        if let Some(path) = lookup("NETGRAPH_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        if self.log_filter.trim().is_empty() {
            return Err("log_filter cannot be empty".to_string());
        }

        if self.storage.backend == StorageBackend::JsonFile {
            self.storage
                .resolve_path()
                .map_err(|e| format!("cannot resolve store path: {}", e))?;
        }

        Ok(())
    }
}
