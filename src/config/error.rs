//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
