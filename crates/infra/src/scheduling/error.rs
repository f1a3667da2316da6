//! Monitor error types

use std::time::Duration;

use matcache_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Background monitor errors
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Monitor is already running
    #[error("Memory monitor already running")]
    AlreadyRunning,

    /// Monitor is not running
    #[error("Memory monitor not running")]
    NotRunning,

    /// Stopping the monitor took too long
    #[error("Memory monitor did not stop within {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: tokio::time::error::Elapsed,
    },

    /// The monitor task panicked or was aborted
    #[error("Memory monitor task join failed: {0}")]
    TaskJoinFailed(#[from] tokio::task::JoinError),
}

impl ErrorClassification for MonitorError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyRunning | Self::NotRunning => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Error,
            Self::TaskJoinFailed(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::TaskJoinFailed(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl From<MonitorError> for CommonError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::AlreadyRunning | MonitorError::NotRunning => {
                CommonError::validation("memory_monitor", err.to_string())
            }
            MonitorError::Timeout { duration, .. } => {
                CommonError::timeout("memory monitor shutdown", duration)
            }
            MonitorError::TaskJoinFailed(_) => {
                CommonError::task_cancelled_with_reason("memory_monitor", err.to_string())
            }
        }
    }
}

/// Convenience type alias for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;
