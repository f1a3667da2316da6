//! Background memory monitor.
//!
//! Samples free host memory on a fixed interval and asks the cache to
//! reclaim the shortfall whenever free memory drops below the configured
//! threshold. A failed sample skips the tick; it never triggers eviction.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use matcache_core::cache::{CacheConfig, MatrixCache};
//! use matcache_infra::platform::MeminfoProbe;
//! use matcache_infra::scheduling::MemoryMonitor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(MatrixCache::new(CacheConfig::default(), Arc::new(MeminfoProbe::default()))?);
//! let mut monitor = MemoryMonitor::new(Arc::clone(&cache), Duration::from_secs(1));
//!
//! monitor.start().await?;
//! // ... application runs ...
//! monitor.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use matcache_core::cache::{MatrixCache, PressureOutcome};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{MonitorError, MonitorResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// How long `stop` waits for the loop to exit
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Tick counters shared with the loop
#[derive(Debug, Default)]
struct TickCounters {
    ticks: AtomicU64,
    reclaims: AtomicU64,
    probe_failures: AtomicU64,
}

/// Periodic pressure check over a [`MatrixCache`]
pub struct MemoryMonitor {
    cache: Arc<MatrixCache>,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    counters: Arc<TickCounters>,
}

impl MemoryMonitor {
    /// Create a stopped monitor ticking every `interval`.
    pub fn new(cache: Arc<MatrixCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            counters: Arc::new(TickCounters::default()),
        }
    }

    /// Start the monitor
    ///
    /// Spawns the background loop on the current Tokio runtime. The first
    /// check runs one interval after start.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::AlreadyRunning`] if the loop is active
    #[instrument(skip(self), fields(interval_ms = self.interval.as_millis() as u64))]
    pub async fn start(&mut self) -> MonitorResult<()> {
        if self.is_running() {
            return Err(MonitorError::AlreadyRunning);
        }

        // Fresh token so the monitor can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let cache = Arc::clone(&self.cache);
        let counters = Arc::clone(&self.counters);
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::monitor_loop(cache, counters, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Memory monitor started");
        Ok(())
    }

    /// Stop the monitor and wait for the loop to exit
    ///
    /// # Errors
    ///
    /// - [`MonitorError::NotRunning`] if the loop is not active
    /// - [`MonitorError::Timeout`] if the loop does not exit in time
    /// - [`MonitorError::TaskJoinFailed`] if the loop panicked
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> MonitorResult<()> {
        if !self.is_running() {
            return Err(MonitorError::NotRunning);
        }

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            tokio::time::timeout(STOP_TIMEOUT, handle)
                .await
                .map_err(|source| MonitorError::Timeout { duration: STOP_TIMEOUT, source })??;
        }

        info!(ticks = self.ticks(), "Memory monitor stopped");
        Ok(())
    }

    /// Check if the monitor loop is active
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks completed since construction
    pub fn ticks(&self) -> u64 {
        self.counters.ticks.load(Ordering::Relaxed)
    }

    /// Ticks that ran a reclaim
    pub fn reclaims(&self) -> u64 {
        self.counters.reclaims.load(Ordering::Relaxed)
    }

    /// Ticks skipped because free memory could not be sampled
    pub fn probe_failures(&self) -> u64 {
        self.counters.probe_failures.load(Ordering::Relaxed)
    }

    async fn monitor_loop(
        cache: Arc<MatrixCache>,
        counters: Arc<TickCounters>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Memory monitor loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    Self::tick(&cache, &counters).await;
                }
            }
        }
    }

    /// One pressure check. The probe read and any reclaim hold the cache
    /// lock and touch the host, so they run on the blocking pool.
    async fn tick(cache: &Arc<MatrixCache>, counters: &TickCounters) {
        let check = Arc::clone(cache);
        let outcome = match tokio::task::spawn_blocking(move || check.relieve_pressure()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "pressure check task failed");
                counters.ticks.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        match outcome {
            PressureOutcome::Healthy { free_bytes } => {
                debug!(free_bytes, "memory above threshold");
            }
            PressureOutcome::Reclaimed { free_bytes, outcome } => {
                counters.reclaims.fetch_add(1, Ordering::Relaxed);
                if outcome.is_empty() {
                    warn!(
                        free_bytes,
                        threshold_bytes = cache.config().threshold_bytes,
                        "memory below threshold with nothing left to evict"
                    );
                }
            }
            PressureOutcome::ProbeUnavailable(err) => {
                counters.probe_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "free memory unavailable, skipping tick");
            }
        }
        counters.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for MemoryMonitor {
    fn drop(&mut self) {
        // Signal the loop; it cannot be awaited here
        self.cancellation_token.cancel();
    }
}
