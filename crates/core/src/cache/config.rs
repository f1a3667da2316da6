//! Cache configuration types and builder patterns
//!
//! The cache has one policy knob, the free-memory threshold, plus the tick
//! interval used by the background monitor.

use std::time::Duration;

use matcache_common::{byte_size, duration_millis};
use serde::{Deserialize, Serialize};

use super::error::{CacheError, CacheResult};

/// Default free-memory threshold: 1 GiB
pub const DEFAULT_THRESHOLD_BYTES: u64 = 1024 * 1024 * 1024;

/// Default monitor tick interval: 1 second
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Bytes of free host memory the cache tries to keep available
    #[serde(with = "byte_size")]
    pub threshold_bytes: u64,

    /// How often the background monitor samples free memory
    #[serde(with = "duration_millis", rename = "monitor_interval_ms")]
    pub monitor_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset with a custom threshold and the default interval
    ///
    /// # Example
    /// ```
    /// use matcache_core::cache::CacheConfig;
    ///
    /// let config = CacheConfig::with_threshold(512 * 1024 * 1024);
    /// assert_eq!(config.threshold_bytes, 512 * 1024 * 1024);
    /// ```
    pub fn with_threshold(threshold_bytes: u64) -> Self {
        Self { threshold_bytes, ..Self::default() }
    }

    /// Check the configuration for values the cache cannot run with.
    ///
    /// # Errors
    /// [`CacheError::InvalidConfig`] when the monitor interval is zero.
    pub fn validate(&self) -> CacheResult<()> {
        if self.monitor_interval.is_zero() {
            return Err(CacheError::InvalidConfig {
                field: "monitor_interval",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-memory threshold in bytes
    pub fn threshold_bytes(mut self, bytes: u64) -> Self {
        self.config.threshold_bytes = bytes;
        self
    }

    /// Set the monitor tick interval
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.config.monitor_interval = interval;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
