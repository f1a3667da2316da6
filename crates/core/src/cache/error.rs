//! Cache error types

use std::fmt;
use std::time::Duration;

use matcache_common::collections::IndexError;
use matcache_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Convenience type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Why a store call was declined without inserting.
///
/// Every variant is a backpressure signal: the caller may retry later or
/// drop the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRejection {
    /// Free memory could not be sampled, so nothing is admitted.
    ProbeUnavailable,

    /// Free memory is already below the threshold. A reclaim ran before
    /// rejecting.
    BelowThreshold {
        /// Sampled free memory
        free_bytes: u64,
        /// Configured threshold
        threshold_bytes: u64,
        /// Bytes released by the reclaim this call triggered
        reclaimed_bytes: usize,
    },

    /// Inserting would push free memory below the threshold.
    InsufficientHeadroom {
        /// Sampled free memory
        free_bytes: u64,
        /// `threshold + entry length`
        required_bytes: u64,
    },
}

impl fmt::Display for AdmissionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbeUnavailable => write!(f, "free memory could not be determined"),
            Self::BelowThreshold { free_bytes, threshold_bytes, reclaimed_bytes } => write!(
                f,
                "free memory {} below threshold {} (reclaimed {} bytes)",
                free_bytes, threshold_bytes, reclaimed_bytes
            ),
            Self::InsufficientHeadroom { free_bytes, required_bytes } => write!(
                f,
                "free memory {} short of the {} bytes needed to stay above threshold",
                free_bytes, required_bytes
            ),
        }
    }
}

/// Cache-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Store declined under memory pressure; retry later
    #[error("store rejected, retry later: {0}")]
    RetryLater(AdmissionRejection),

    /// No live entry with this identifier
    #[error("no cached entry with identifier {identifier}")]
    NotFound { identifier: i64 },

    /// An entry with this identifier is already live
    #[error("an entry with identifier {identifier} is already cached")]
    AlreadyExists { identifier: i64 },

    /// `data.len()` does not match `rows * cols`, or the size overflows
    #[error("invalid shape {rows}x{cols} for {len} elements")]
    InvalidShape { rows: usize, cols: usize, len: usize },

    /// Destination buffer shorter than the entry
    #[error("destination holds {actual} elements, entry needs {required}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Buffer allocation failed after admission
    #[error("failed to allocate {bytes} bytes for entry buffer")]
    AllocationFailed { bytes: usize },

    /// Index insert failed after admission; the store is unchanged
    #[error("index update failed: {0}")]
    Index(#[from] IndexError),

    /// Configuration rejected by validation
    #[error("invalid configuration for '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },
}

/// Suggested retry delay for admission rejections.
///
/// Matches the default monitor tick: by then the monitor has had a chance
/// to reclaim.
const RETRY_AFTER: Duration = Duration::from_secs(1);

impl ErrorClassification for CacheError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryLater(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RetryLater(_) => ErrorSeverity::Warning,
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::AlreadyExists { .. }
            | Self::InvalidShape { .. }
            | Self::BufferTooSmall { .. }
            | Self::InvalidConfig { .. } => ErrorSeverity::Error,
            Self::AllocationFailed { .. } | Self::Index(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        self.is_retryable().then_some(RETRY_AFTER)
    }
}

impl From<CacheError> for CommonError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::RetryLater(reason) => CommonError::backpressure_with_retry(
                "host memory",
                reason.to_string(),
                RETRY_AFTER,
            ),
            CacheError::NotFound { identifier } => {
                CommonError::not_found_with_id("cache entry", identifier.to_string())
            }
            CacheError::AlreadyExists { identifier } => CommonError::validation_with_value(
                "identifier",
                "already cached",
                identifier.to_string(),
            ),
            CacheError::InvalidShape { rows, cols, len } => CommonError::validation_with_value(
                "data",
                format!("expected {rows}x{cols} elements"),
                len.to_string(),
            ),
            CacheError::BufferTooSmall { required, actual } => CommonError::validation_with_value(
                "destination",
                format!("needs {required} elements"),
                actual.to_string(),
            ),
            CacheError::AllocationFailed { bytes } => CommonError::resource_exhausted(
                "entry buffer",
                format!("allocation of {bytes} bytes failed"),
            ),
            CacheError::Index(err) => {
                CommonError::internal_with_context(err.to_string(), "entry store")
            }
            CacheError::InvalidConfig { field, message } => {
                CommonError::config_field(field, message)
            }
        }
    }
}
