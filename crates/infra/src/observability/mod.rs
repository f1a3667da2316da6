//! Logging setup for processes embedding the cache
//!
//! The cache crates only emit `tracing` events. Hosts that do not install
//! their own subscriber can call [`init`] once at startup.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the
//! `default_filter` argument:
//!
//! ```no_run
//! use matcache_infra::observability::{self, LogFormat};
//!
//! observability::init(LogFormat::Pretty, "matcache=info").ok();
//! ```

use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    /// The default filter directive did not parse
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// A global subscriber is already installed
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter: `RUST_LOG` if set, else `default_filter`.
///
/// # Errors
/// [`ObservabilityError::InvalidFilter`] if `default_filter` is needed and
/// does not parse.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter, ObservabilityError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| ObservabilityError::InvalidFilter {
            filter: default_filter.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Install a global subscriber writing to stderr.
///
/// # Errors
/// - [`ObservabilityError::InvalidFilter`] for a bad `default_filter`
/// - [`ObservabilityError::AlreadyInitialized`] if a subscriber exists
pub fn init(format: LogFormat, default_filter: &str) -> Result<(), ObservabilityError> {
    let filter = env_filter(default_filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = env_filter("matcache=loud").unwrap_err();
        assert!(matches!(err, ObservabilityError::InvalidFilter { .. }));
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        let first = init(LogFormat::Pretty, "warn");
        let second = init(LogFormat::Json, "warn");

        // Another test may have installed one first; either way the second
        // call must fail
        assert!(first.is_ok() || matches!(first, Err(ObservabilityError::AlreadyInitialized(_))));
        assert!(matches!(second, Err(ObservabilityError::AlreadyInitialized(_))));
    }
}
