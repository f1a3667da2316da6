//! Common error types and utilities shared by the matcache crates
//!
//! This module provides the shared error vocabulary. It has three parts:
//!
//! 1. **`CommonError`**: an enum of error patterns that appear in more than
//!    one crate (configuration, validation, missing resources, backpressure,
//!    resource exhaustion, timeouts, cancelled tasks, I/O, internal faults)
//!
//! 2. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability, severity and criticality
//!
//! 3. **`ErrorSeverity` enum**: a unified severity scale for logging
//!
//! ## When to Use CommonError vs Module-Specific Errors
//!
//! Module-specific errors (`CacheError`, `MonitorError`, ...) carry the domain
//! detail and implement [`ErrorClassification`] themselves. They convert
//! *into* `CommonError` when a caller wants to handle every layer with one
//! type:
//!
//! ```rust,ignore
//! impl From<CacheError> for CommonError {
//!     fn from(err: CacheError) -> Self {
//!         match err {
//!             CacheError::NotFound { identifier } => {
//!                 CommonError::not_found_with_id("cache entry", identifier.to_string())
//!             }
//!             other => CommonError::internal_with_context(other.to_string(), "cache"),
//!         }
//!     }
//! }
//! ```
//!
//! ## Standard Error Patterns
//!
//! | Pattern | CommonError Variant | When to Use |
//! |---------|-------------------|-------------|
//! | **Backpressure** | `Backpressure` | Resource under pressure, caller should retry later |
//! | **Exhaustion** | `ResourceExhausted` | Allocation or capacity failure after admission |
//! | **Timeouts** | `Timeout` | Operation deadlines, joins that hang |
//! | **Validation** | `Validation` | Input validation, shape mismatches |
//! | **Configuration** | `Config` | Invalid settings, missing config |
//! | **I/O** | `Io` | Reading host statistics or config files |
//! | **Not Found** | `NotFound` | Missing resources |
//! | **Internal** | `Internal` | Bugs, invariant violations |
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Entry not found, task cancelled |
//! | **Warning** | Degraded but operational | Memory pressure, timeouts |
//! | **Error** | Failure requiring attention | Invalid input, config errors |
//! | **Critical** | Integrity at risk | Index inconsistency, allocation failure |

use std::fmt;
use std::time::Duration;

/// Common error variants that appear across multiple crates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String, field: Option<String> },

    /// Validation errors
    Validation { field: String, message: String, value: Option<String> },

    /// Resource not found errors
    NotFound { resource_type: String, identifier: Option<String> },

    /// A resource is under pressure and the request was declined for now
    Backpressure { resource: String, message: String, retry_after: Option<Duration> },

    /// Allocation or capacity exhausted after a request was admitted
    ResourceExhausted { resource: String, message: String },

    /// Timeout errors
    Timeout { operation: String, duration: Duration },

    /// Task cancellation (async)
    TaskCancelled { task_id: String, reason: Option<String> },

    /// I/O errors (host statistics, config files)
    Io { message: String, path: Option<String> },

    /// Internal errors that shouldn't normally occur
    Internal { message: String, context: Option<String> },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field } => {
                if let Some(field) = field {
                    write!(f, "Configuration error in field '{}': {}", field, message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::Validation { field, message, value } => {
                if let Some(value) = value {
                    write!(
                        f,
                        "Validation error for field '{}' (value: '{}'): {}",
                        field, value, message
                    )
                } else {
                    write!(f, "Validation error for field '{}': {}", field, message)
                }
            }
            Self::NotFound { resource_type, identifier } => {
                if let Some(id) = identifier {
                    write!(f, "{} not found: '{}'", resource_type, id)
                } else {
                    write!(f, "{} not found", resource_type)
                }
            }
            Self::Backpressure { resource, message, retry_after } => {
                if let Some(retry) = retry_after {
                    write!(f, "'{}' under pressure: {} (retry in {:?})", resource, message, retry)
                } else {
                    write!(f, "'{}' under pressure: {}", resource, message)
                }
            }
            Self::ResourceExhausted { resource, message } => {
                write!(f, "Resource '{}' exhausted: {}", resource, message)
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{}' timed out after {:?}", operation, duration)
            }
            Self::TaskCancelled { task_id, reason } => {
                if let Some(reason) = reason {
                    write!(f, "Task '{}' cancelled: {}", task_id, reason)
                } else {
                    write!(f, "Task '{}' cancelled", task_id)
                }
            }
            Self::Io { message, path } => {
                if let Some(path) = path {
                    write!(f, "I/O error on '{}': {}", path, message)
                } else {
                    write!(f, "I/O error: {}", message)
                }
            }
            Self::Internal { message, context } => {
                if let Some(ctx) = context {
                    write!(f, "Internal error in '{}': {}", ctx, message)
                } else {
                    write!(f, "Internal error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Backpressure { .. } | Self::Timeout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Validation { .. } => ErrorSeverity::Error,
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::Backpressure { .. } => ErrorSeverity::Warning,
            Self::ResourceExhausted { .. } => ErrorSeverity::Critical,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::TaskCancelled { .. } => ErrorSeverity::Info,
            Self::Io { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. } | Self::ResourceExhausted { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Backpressure { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: None }
    }

    /// Create a validation error with the invalid value
    pub fn validation_with_value<F: Into<String>, M: Into<String>, V: Into<String>>(
        field: F,
        message: M,
        value: V,
    ) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: Some(value.into()) }
    }

    /// Create a not found error with identifier
    pub fn not_found_with_id<T: Into<String>, I: Into<String>>(
        resource_type: T,
        identifier: I,
    ) -> Self {
        Self::NotFound { resource_type: resource_type.into(), identifier: Some(identifier.into()) }
    }

    /// Create a backpressure error with a suggested retry delay
    pub fn backpressure_with_retry<R: Into<String>, M: Into<String>>(
        resource: R,
        message: M,
        retry_after: Duration,
    ) -> Self {
        Self::Backpressure {
            resource: resource.into(),
            message: message.into(),
            retry_after: Some(retry_after),
        }
    }

    /// Create a resource exhaustion error
    pub fn resource_exhausted<R: Into<String>, M: Into<String>>(resource: R, message: M) -> Self {
        Self::ResourceExhausted { resource: resource.into(), message: message.into() }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    /// Create a task cancellation error with reason
    pub fn task_cancelled_with_reason<S: Into<String>, R: Into<String>>(
        task_id: S,
        reason: R,
    ) -> Self {
        Self::TaskCancelled { task_id: task_id.into(), reason: Some(reason.into()) }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into(), path: None }
    }

    /// Create an I/O error for a specific path
    pub fn io_path<S: Into<String>, P: Into<String>>(path: P, message: S) -> Self {
        Self::Io { message: message.into(), path: Some(path.into()) }
    }

    /// Create an internal error with context
    pub fn internal_with_context<S: Into<String>, C: Into<String>>(message: S, context: C) -> Self {
        Self::Internal { message: message.into(), context: Some(context.into()) }
    }

    /// Get the error type name for categorization
    pub fn error_type_name(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Backpressure { .. } => "backpressure",
            Self::ResourceExhausted { .. } => "resource_exhausted",
            Self::Timeout { .. } => "timeout",
            Self::TaskCancelled { .. } => "task_cancelled",
            Self::Io { .. } => "io",
            Self::Internal { .. } => "internal",
        }
    }

    /// Emit this error as one tracing event, at a level matching its
    /// severity.
    #[cfg(feature = "observability")]
    pub fn trace(&self, context: &str) {
        let error_type = self.error_type_name();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(error_type, context, error = %self, "operation failed");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error_type, context, error = %self, "operation failed");
            }
            ErrorSeverity::Info => {
                tracing::info!(error_type, context, error = %self, "operation failed");
            }
        }
    }
}

/// Error classification trait for consistent error handling across crates
///
/// # Example
///
/// ```rust,ignore
/// use matcache_common::error::ErrorClassification;
///
/// match cache.store(&data, rows, cols, id, priority) {
///     Err(e) if e.is_retryable() => schedule_retry(e.retry_after()),
///     Err(e) if e.is_critical() => alert(e),
///     other => other?,
/// }
/// ```
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient conditions that may succeed if the
    /// operation is attempted again, such as memory pressure or timeouts.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    ///
    /// Critical errors indicate internal invariant violations or exhausted
    /// resources after admission.
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
