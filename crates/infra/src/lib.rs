//! # matcache infrastructure
//!
//! Host-facing implementations around `matcache-core`.
//!
//! This crate contains:
//! - [`platform`]: the `/proc/meminfo` memory probe
//! - [`scheduling`]: the cancellable background memory monitor
//! - [`config`]: settings from environment variables and files
//! - [`service`]: probe, cache and monitor wired together
//! - [`observability`]: optional `tracing` subscriber setup
//!
//! ## Architecture
//! - Implements the `MemoryProbe` port defined in `matcache-core`
//! - Contains all "impure" code (file I/O, Tokio tasks)

#![forbid(unsafe_code)]

pub mod config;
pub mod observability;
pub mod platform;
pub mod scheduling;
pub mod service;

// Re-export commonly used items
pub use config::{CacheSettings, ConfigError, ProbeSettings};
pub use platform::{MeminfoField, MeminfoProbe};
pub use scheduling::{MemoryMonitor, MonitorError};
pub use service::{CacheService, ServiceError};
