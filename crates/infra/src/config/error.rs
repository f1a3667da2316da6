//! Configuration error types

use std::path::PathBuf;

use matcache_common::error::CommonError;
use matcache_core::cache::CacheError;
use thiserror::Error;

/// Errors raised while loading cache settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist
    #[error("Config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Reading the file failed
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents did not parse
    #[error("Invalid {format} format: {message}")]
    InvalidFormat { format: &'static str, message: String },

    /// File extension is neither `.toml` nor `.json`
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// An environment variable held an unusable value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// Settings parsed but failed cache validation
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<ConfigError> for CommonError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { key, message } => CommonError::config_field(key, message),
            ConfigError::FileNotFound { ref path } | ConfigError::Read { ref path, .. } => {
                CommonError::io_path(path.display().to_string(), err.to_string())
            }
            ConfigError::Cache(inner) => inner.into(),
            other => CommonError::config(other.to_string()),
        }
    }
}

/// Convenience type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
