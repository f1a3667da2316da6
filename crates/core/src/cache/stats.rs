//! Cache statistics and metrics tracking
//!
//! Counters are updated with relaxed atomics outside the store lock, so a
//! snapshot taken under concurrent load is approximate across fields.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Snapshot of cache activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Live entries at snapshot time
    pub entries: usize,

    /// Live buffer bytes at snapshot time
    pub resident_bytes: usize,

    /// Successful stores
    pub stores: u64,

    /// Stores declined with a retry-later status
    pub rejections: u64,

    /// Lookups (`fetch`, `fetch_vec`, `get_size`) that found their entry
    pub hits: u64,

    /// Lookups for absent identifiers
    pub misses: u64,

    /// Entries removed by reclaim passes
    pub evictions: u64,

    /// Bytes released by reclaim passes
    pub evicted_bytes: u64,

    /// Reclaim passes run, including ones that evicted nothing
    pub reclaim_runs: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total lookups)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of store attempts that were declined
    pub fn rejection_rate(&self) -> f64 {
        let total = self.stores + self.rejections;
        if total == 0 {
            0.0
        } else {
            self.rejections as f64 / total as f64
        }
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    stores: Arc<AtomicU64>,
    rejections: Arc<AtomicU64>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
    evicted_bytes: Arc<AtomicU64>,
    reclaim_runs: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one reclaim pass and what it released
    pub(crate) fn record_reclaim(&self, entries: usize, bytes: usize) {
        self.reclaim_runs.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(entries as u64, Ordering::Relaxed);
        self.evicted_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, entries: usize, resident_bytes: usize) -> CacheStats {
        CacheStats {
            entries,
            resident_bytes,
            stores: self.stores.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            evicted_bytes: self.evicted_bytes.load(Ordering::Relaxed),
            reclaim_runs: self.reclaim_runs.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub(crate) fn reset(&self) {
        for counter in [
            &self.stores,
            &self.rejections,
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.evicted_bytes,
            &self.reclaim_runs,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::stats.
    use super::*;

    /// Validates rates on an idle collector.
    #[test]
    fn test_rates_without_activity() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.rejection_rate(), 0.0);
    }

    /// Validates counters flow into the snapshot.
    ///
    /// Assertions:
    /// - Reclaim records runs, entries and bytes.
    /// - Clones share counters.
    #[test]
    fn test_collector_snapshot() {
        let metrics = MetricsCollector::new();
        let shared = metrics.clone();

        metrics.record_store();
        metrics.record_store();
        shared.record_rejection();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        shared.record_reclaim(2, 64);
        shared.record_reclaim(0, 0);

        let stats = metrics.snapshot(5, 128);
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.resident_bytes, 128);
        assert_eq!(stats.stores, 2);
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.evicted_bytes, 64);
        assert_eq!(stats.reclaim_runs, 2);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((stats.rejection_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    /// Validates reset zeroes counters.
    #[test]
    fn test_collector_reset() {
        let metrics = MetricsCollector::new();
        metrics.record_store();
        metrics.record_reclaim(1, 8);
        metrics.reset();

        assert_eq!(metrics.snapshot(0, 0), CacheStats::default());
    }
}
