//! Background task scheduling
//!
//! The memory monitor is the only background task. Like every scheduler in
//! this crate it has:
//! - Explicit lifecycle management (start/stop)
//! - A join handle for the spawned task
//! - Cancellation token support
//! - A bounded wait on shutdown

pub mod error;
pub mod memory_monitor;

pub use error::{MonitorError, MonitorResult};
pub use memory_monitor::MemoryMonitor;
