//! # matcache core
//!
//! In-process cache for `f64` matrices that evicts by priority when host
//! free memory drops below a threshold.
//!
//! This crate contains:
//! - [`cache`]: the entry store, eviction engine and [`MatrixCache`] API
//! - [`memory`]: the [`MemoryProbe`] port used for admission and eviction
//!
//! ## Architecture Principles
//! - Only depends on `matcache-common`
//! - No platform or runtime code; the probe and the background monitor live
//!   in `matcache-infra`
//! - Everything synchronous, guarded by one exclusive lock

#![forbid(unsafe_code)]

pub mod cache;
pub mod memory;

pub use cache::{
    AdmissionRejection, CacheConfig, CacheError, CacheResult, CacheStats, MatrixCache,
    PressureOutcome, ReclaimOutcome,
};
pub use memory::{ManualProbe, MemoryProbe, ProbeError};
