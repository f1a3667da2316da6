//! Running cache: probe, cache and monitor wired together
//!
//! ```no_run
//! use matcache_infra::config;
//! use matcache_infra::service::CacheService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut service = CacheService::init(config::load()?).await?;
//!
//! let cache = service.cache();
//! cache.store(&[1.0, 2.0, 3.0, 4.0], 2, 2, 7, 0)?;
//!
//! service.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use matcache_common::error::CommonError;
use matcache_core::cache::{CacheConfig, CacheError, MatrixCache};
use matcache_core::memory::MemoryProbe;
use thiserror::Error;
use tracing::info;

use crate::config::CacheSettings;
use crate::platform::MeminfoProbe;
use crate::scheduling::{MemoryMonitor, MonitorError};

/// Errors raised while starting or stopping the service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Cache construction failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Monitor start or stop failed
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl From<ServiceError> for CommonError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Cache(inner) => inner.into(),
            ServiceError::Monitor(inner) => inner.into(),
        }
    }
}

/// A cache with its background monitor running.
///
/// Construct once per process and hand out [`cache`](Self::cache) handles.
pub struct CacheService {
    cache: Arc<MatrixCache>,
    monitor: MemoryMonitor,
}

impl CacheService {
    /// Build the meminfo probe and cache from `settings`, then start the
    /// monitor.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    /// [`ServiceError`] if the settings are invalid or the monitor fails to
    /// start.
    pub async fn init(settings: CacheSettings) -> Result<Self, ServiceError> {
        let probe = MeminfoProbe::new(settings.probe.meminfo_path, settings.probe.field);
        Self::with_probe(settings.cache, Arc::new(probe)).await
    }

    /// Same as [`init`](Self::init) with a caller-supplied probe.
    ///
    /// # Errors
    /// See [`init`](Self::init).
    pub async fn with_probe(
        config: CacheConfig,
        probe: Arc<dyn MemoryProbe>,
    ) -> Result<Self, ServiceError> {
        let threshold_bytes = config.threshold_bytes;
        let interval = config.monitor_interval;

        let cache = Arc::new(MatrixCache::new(config, probe).inspect_err(|e| {
            CommonError::from(e.clone()).trace("cache service init");
        })?);

        let mut monitor = MemoryMonitor::new(Arc::clone(&cache), interval);
        monitor.start().await?;

        info!(threshold_bytes, interval_ms = interval.as_millis() as u64, "Cache service started");
        Ok(Self { cache, monitor })
    }

    /// Shared handle to the cache
    pub fn cache(&self) -> Arc<MatrixCache> {
        Arc::clone(&self.cache)
    }

    pub fn monitor(&self) -> &MemoryMonitor {
        &self.monitor
    }

    /// Stop the monitor and wait for it to exit.
    ///
    /// Entries stay cached; handles returned by [`cache`](Self::cache) keep
    /// working without background eviction.
    ///
    /// # Errors
    /// [`ServiceError::Monitor`] if the monitor was not running or did not
    /// stop cleanly.
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        self.monitor.stop().await?;
        info!(entries = self.cache.len(), "Cache service stopped");
        Ok(())
    }
}
