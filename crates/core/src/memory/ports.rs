//! Port interfaces for host memory sampling
//!
//! These traits define the boundary between the cache's admission and
//! eviction policy and the platform code that reads free memory.

use std::sync::Arc;

use matcache_common::error::CommonError;
use thiserror::Error;

/// Reasons a free-memory sample could not be taken.
///
/// A probe error means "memory status unknown". It must never be read as
/// "zero bytes free".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The statistic source does not exist on this host.
    #[error("memory statistics unavailable: {0}")]
    Unavailable(String),

    /// Reading the statistic source failed.
    #[error("failed to read memory statistics: {0}")]
    Io(String),

    /// The statistic source was readable but not understood.
    #[error("failed to parse memory statistics: {0}")]
    Parse(String),
}

impl From<ProbeError> for CommonError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Io(message) => CommonError::io(message),
            other => CommonError::internal_with_context(other.to_string(), "memory probe"),
        }
    }
}

/// Samples the host's free memory.
pub trait MemoryProbe: Send + Sync {
    /// Current free host memory in bytes.
    ///
    /// # Errors
    /// Returns [`ProbeError`] when the figure cannot be determined.
    fn free_memory(&self) -> Result<u64, ProbeError>;
}

impl<T: MemoryProbe + ?Sized> MemoryProbe for Arc<T> {
    fn free_memory(&self) -> Result<u64, ProbeError> {
        (**self).free_memory()
    }
}
