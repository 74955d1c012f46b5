//! Configuration for the OpLog recorder.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `OPLOG_WORKSPACE` | No | current directory | Workspace root to record |
//! | `OPLOG_ARTIFACT` | No | `operation.json` | Artifact filename written at stop |
//! | `OPLOG_IGNORE_FILE` | No | `.gitignore` | Ignore-specification filename |
//! | `OPLOG_BUFFER_SIZE` | No | 1024 | Event channel capacity |

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default artifact filename, written at the workspace root.
pub const DEFAULT_ARTIFACT_NAME: &str = "operation.json";

/// Default ignore-specification filename.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Default event channel capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for the recorder daemon.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root override; `None` means use the current directory.
    pub workspace: Option<PathBuf>,

    /// Artifact filename, relative to the workspace root.
    pub artifact_name: String,

    /// Ignore-specification filename, relative to the workspace root.
    pub ignore_file: String,

    /// Capacity of the host-event channel.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Creates a `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `OPLOG_BUFFER_SIZE` is not a positive
    /// integer, or if `OPLOG_ARTIFACT` / `OPLOG_IGNORE_FILE` contain path
    /// separators (they must be bare filenames at the workspace root).
    pub fn from_env() -> Result<Self, ConfigError> {
        let workspace = env::var("OPLOG_WORKSPACE").ok().map(PathBuf::from);

        let artifact_name = env::var("OPLOG_ARTIFACT")
            .ok()
            .map(|name| validate_filename("OPLOG_ARTIFACT", name))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string());

        let ignore_file = env::var("OPLOG_IGNORE_FILE")
            .ok()
            .map(|name| validate_filename("OPLOG_IGNORE_FILE", name))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_IGNORE_FILE.to_string());

        let buffer_size = match env::var("OPLOG_BUFFER_SIZE") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "OPLOG_BUFFER_SIZE".to_string(),
                        message: "expected positive integer".to_string(),
                    })
                }
            },
            Err(_) => DEFAULT_BUFFER_SIZE,
        };

        Ok(Self {
            workspace,
            artifact_name,
            ignore_file,
            buffer_size,
        })
    }
}

fn validate_filename(key: &str, name: String) -> Result<String, ConfigError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "expected a bare filename".to_string(),
        });
    }
    Ok(name)
}
