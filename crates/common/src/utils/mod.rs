//! Common utility functions
//!
//! This module provides reusable utilities including:
//! - **[`serde`]**: Serialization helpers for durations and byte sizes

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::{byte_size, duration_millis};
