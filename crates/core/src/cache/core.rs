//! Memory-pressure-aware matrix cache
//!
//! [`MatrixCache`] owns an [`EntryStore`] behind one exclusive lock and
//! consults a [`MemoryProbe`] on every store. Probing happens outside the
//! lock; every index access and every lookup-plus-copy happens inside it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use super::config::CacheConfig;
use super::entry::{checked_byte_len, CacheEntry};
use super::error::{AdmissionRejection, CacheError, CacheResult};
use super::eviction::{self, ReclaimOutcome};
use super::stats::{CacheStats, MetricsCollector};
use super::store::EntryStore;
use crate::memory::{MemoryProbe, ProbeError};

/// Result of one pressure check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressureOutcome {
    /// Free memory at or above the threshold; nothing evicted.
    Healthy { free_bytes: u64 },

    /// Free memory below the threshold; a reclaim ran.
    Reclaimed { free_bytes: u64, outcome: ReclaimOutcome },

    /// The probe failed; the check was skipped and nothing evicted.
    ProbeUnavailable(ProbeError),
}

/// Saturating `u64 -> usize` for byte targets on 32-bit hosts.
fn byte_target(bytes: u64) -> usize {
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

/// In-process cache of `f64` matrices with priority-based eviction under
/// host memory pressure.
///
/// Share it with `Arc`; every method takes `&self`.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use matcache_core::cache::{CacheConfig, MatrixCache};
/// use matcache_core::memory::ManualProbe;
///
/// let probe = Arc::new(ManualProbe::new(1 << 30));
/// let cache = MatrixCache::new(CacheConfig::with_threshold(1 << 20), probe).unwrap();
///
/// cache.store(&[1.0, 2.0, 3.0, 4.0], 2, 2, 42, 0).unwrap();
/// assert_eq!(cache.get_size(42).unwrap(), (2, 2));
///
/// let mut out = [0.0; 4];
/// cache.fetch(42, &mut out).unwrap();
/// assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
/// ```
pub struct MatrixCache {
    store: Mutex<EntryStore>,
    config: CacheConfig,
    probe: Arc<dyn MemoryProbe>,
    metrics: MetricsCollector,
}

impl fmt::Debug for MatrixCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixCache")
            .field("config", &self.config)
            .field("store", &*self.store.lock())
            .finish_non_exhaustive()
    }
}

impl MatrixCache {
    /// Create an empty cache.
    ///
    /// # Errors
    /// [`CacheError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: CacheConfig, probe: Arc<dyn MemoryProbe>) -> CacheResult<Self> {
        Self::with_store(config, probe, EntryStore::new())
    }

    /// Create a cache around a prepared store, e.g. one with index limits.
    ///
    /// # Errors
    /// [`CacheError::InvalidConfig`] if `config` fails validation.
    pub fn with_store(
        config: CacheConfig,
        probe: Arc<dyn MemoryProbe>,
        store: EntryStore,
    ) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self { store: Mutex::new(store), config, probe, metrics: MetricsCollector::new() })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Copy `data` into the cache as a `rows x cols` matrix.
    ///
    /// Admission works on a fresh free-memory sample:
    /// - probe failure: rejected, nothing evicted
    /// - free below the threshold: a reclaim of the shortfall runs, then the
    ///   call is rejected
    /// - free below `threshold + len`: rejected, nothing evicted
    /// - otherwise the buffer is allocated and inserted into both indexes
    ///
    /// # Errors
    /// - [`CacheError::InvalidShape`] if `data.len() != rows * cols`
    /// - [`CacheError::RetryLater`] on any admission rejection
    /// - [`CacheError::AlreadyExists`] if `identifier` is live
    /// - [`CacheError::AllocationFailed`] / [`CacheError::Index`] on internal
    ///   failure; the cache is unchanged
    pub fn store(
        &self,
        data: &[f64],
        rows: usize,
        cols: usize,
        identifier: i64,
        priority: i64,
    ) -> CacheResult<()> {
        let len = checked_byte_len(rows, cols, data.len())?;

        let free_bytes = match self.probe.free_memory() {
            Ok(free) => free,
            Err(err) => {
                warn!(identifier, error = %err, "free memory unknown, store rejected");
                return self.reject(AdmissionRejection::ProbeUnavailable);
            }
        };

        let threshold_bytes = self.config.threshold_bytes;
        if free_bytes < threshold_bytes {
            let outcome = self.reclaim(byte_target(threshold_bytes - free_bytes));
            return self.reject(AdmissionRejection::BelowThreshold {
                free_bytes,
                threshold_bytes,
                reclaimed_bytes: outcome.bytes,
            });
        }

        let required_bytes = threshold_bytes.saturating_add(len as u64);
        if free_bytes < required_bytes {
            return self.reject(AdmissionRejection::InsufficientHeadroom { free_bytes, required_bytes });
        }

        // Re-checked by the insert under the lock
        if self.contains(identifier) {
            return Err(CacheError::AlreadyExists { identifier });
        }

        let entry = CacheEntry::copy_from(identifier, priority, rows, cols, data)?;
        self.store.lock().insert(entry)?;
        self.metrics.record_store();
        debug!(identifier, priority, rows, cols, bytes = len, "stored entry");
        Ok(())
    }

    fn reject(&self, reason: AdmissionRejection) -> CacheResult<()> {
        self.metrics.record_rejection();
        debug!(%reason, "store rejected");
        Err(CacheError::RetryLater(reason))
    }

    /// Copy an entry into the front of `destination`.
    ///
    /// The entry is left in place and keeps its priority.
    ///
    /// # Errors
    /// - [`CacheError::NotFound`] if `identifier` is not live
    /// - [`CacheError::BufferTooSmall`] if `destination` is too short
    pub fn fetch(&self, identifier: i64, destination: &mut [f64]) -> CacheResult<()> {
        let store = self.store.lock();
        let entry = self.lookup(&store, identifier)?;
        entry.copy_into(destination)
    }

    /// Copy an entry into a new vector.
    ///
    /// # Errors
    /// [`CacheError::NotFound`] if `identifier` is not live.
    pub fn fetch_vec(&self, identifier: i64) -> CacheResult<Vec<f64>> {
        let store = self.store.lock();
        self.lookup(&store, identifier).map(|entry| entry.data().to_vec())
    }

    /// `(rows, cols)` of a live entry.
    ///
    /// # Errors
    /// [`CacheError::NotFound`] if `identifier` is not live.
    pub fn get_size(&self, identifier: i64) -> CacheResult<(usize, usize)> {
        let store = self.store.lock();
        self.lookup(&store, identifier).map(CacheEntry::shape)
    }

    fn lookup<'s>(&self, store: &'s EntryStore, identifier: i64) -> CacheResult<&'s CacheEntry> {
        match store.get(identifier) {
            Some(entry) => {
                self.metrics.record_hit();
                Ok(entry)
            }
            None => {
                self.metrics.record_miss();
                Err(CacheError::NotFound { identifier })
            }
        }
    }

    pub fn contains(&self, identifier: i64) -> bool {
        self.store.lock().contains(identifier)
    }

    /// Remove one entry. Returns the bytes released.
    ///
    /// # Errors
    /// - [`CacheError::NotFound`] if `identifier` is not live
    /// - [`CacheError::Index`] if the indexes disagreed about the entry
    pub fn remove(&self, identifier: i64) -> CacheResult<usize> {
        let removed = self.store.lock().remove(identifier)?;
        removed
            .map(|entry| entry.byte_len())
            .ok_or(CacheError::NotFound { identifier })
    }

    /// Drop every entry. Returns the bytes released.
    pub fn clear(&self) -> usize {
        let released = self.store.lock().clear();
        info!(released, "cache cleared");
        released
    }

    /// Evict lowest-priority entries until `target_bytes` are released or
    /// the cache is empty.
    pub fn reclaim(&self, target_bytes: usize) -> ReclaimOutcome {
        let outcome = eviction::reclaim(&mut self.store.lock(), target_bytes);
        self.metrics.record_reclaim(outcome.entries, outcome.bytes);
        if !outcome.is_empty() {
            info!(
                target_bytes,
                evicted = outcome.entries,
                freed = outcome.bytes,
                "reclaimed memory"
            );
        }
        outcome
    }

    /// Sample free memory once and reclaim the shortfall below the
    /// threshold, if any.
    ///
    /// This is the background monitor's tick. A probe failure skips the
    /// check rather than evicting.
    #[instrument(level = "debug", skip(self))]
    pub fn relieve_pressure(&self) -> PressureOutcome {
        let free_bytes = match self.probe.free_memory() {
            Ok(free) => free,
            Err(err) => return PressureOutcome::ProbeUnavailable(err),
        };

        let threshold_bytes = self.config.threshold_bytes;
        if free_bytes >= threshold_bytes {
            return PressureOutcome::Healthy { free_bytes };
        }

        let outcome = self.reclaim(byte_target(threshold_bytes - free_bytes));
        PressureOutcome::Reclaimed { free_bytes, outcome }
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Sum of live buffer sizes in bytes.
    pub fn resident_bytes(&self) -> usize {
        self.store.lock().resident_bytes()
    }

    /// Live identifiers in eviction order (lowest priority first).
    pub fn eviction_order(&self) -> Vec<i64> {
        self.store.lock().eviction_order()
    }

    /// Verify both indexes describe the same entries.
    ///
    /// # Errors
    /// [`CacheError::Index`] naming the first mismatched key.
    pub fn check_consistency(&self) -> CacheResult<()> {
        self.store.lock().check_consistency().map_err(CacheError::from)
    }

    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock();
        self.metrics.snapshot(store.len(), store.resident_bytes())
    }

    /// Zero the activity counters. Entry counts are unaffected.
    pub fn reset_stats(&self) {
        self.metrics.reset();
    }
}
