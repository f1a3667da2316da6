//! Matrix cache with memory-pressure eviction
//!
//! # Layout
//!
//! - [`entry`]: a cached matrix and its owned buffer
//! - [`store`]: the dual-indexed entry store with transactional insert
//! - [`eviction`]: priority-ascending reclaim
//! - [`core`](self::core): [`MatrixCache`], the locked public API
//! - [`config`] / [`error`] / [`stats`]: configuration, errors and counters
//!
//! # Admission
//!
//! Every store samples free host memory through a
//! [`MemoryProbe`](crate::memory::MemoryProbe). Entries are admitted only if
//! free memory stays at or above `threshold_bytes` after the insert. When
//! free memory is already below the threshold the store reclaims the
//! shortfall and asks the caller to retry.
//!
//! # Eviction order
//!
//! Lowest priority first. Equal priorities leave in insertion order.
//! Priorities are fixed at store time; fetches never re-rank.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//!
//! use matcache_core::cache::{AdmissionRejection, CacheConfig, CacheError, MatrixCache};
//! use matcache_core::memory::ManualProbe;
//!
//! let probe = Arc::new(ManualProbe::new(10_000));
//! let cache = MatrixCache::new(CacheConfig::with_threshold(9_990), probe.clone()).unwrap();
//!
//! // 2 x 1 matrix = 16 bytes, but only 10 bytes of headroom
//! let err = cache.store(&[1.0, 2.0], 2, 1, 7, 0).unwrap_err();
//! assert!(matches!(err, CacheError::RetryLater(AdmissionRejection::InsufficientHeadroom { .. })));
//!
//! probe.set_free(20_000);
//! cache.store(&[1.0, 2.0], 2, 1, 7, 0).unwrap();
//! assert_eq!(cache.fetch_vec(7).unwrap(), vec![1.0, 2.0]);
//! ```

pub mod config;
pub mod core;
pub mod entry;
pub mod error;
pub mod eviction;
pub mod stats;
pub mod store;

pub use self::config::{
    CacheConfig, CacheConfigBuilder, DEFAULT_MONITOR_INTERVAL, DEFAULT_THRESHOLD_BYTES,
};
pub use self::core::{MatrixCache, PressureOutcome};
pub use self::entry::{CacheEntry, ELEMENT_SIZE};
pub use self::error::{AdmissionRejection, CacheError, CacheResult};
pub use self::eviction::{reclaim, ReclaimOutcome};
pub use self::stats::CacheStats;
pub use self::store::EntryStore;
