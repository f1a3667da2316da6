//! Specialized data structures
//!
//! - **[`ordered_index`]**: integer-keyed ordered indexes with unique and
//!   duplicate-key variants
//!
//! ## Usage
//!
//! ```rust
//! use matcache_common::collections::{DuplicateIndex, UniqueIndex};
//!
//! let mut by_id: UniqueIndex<&str> = UniqueIndex::new();
//! let mut by_rank: DuplicateIndex<i64> = DuplicateIndex::new();
//! by_id.try_insert(1, "a").unwrap();
//! by_rank.try_insert(10, 1).unwrap();
//! ```

pub mod ordered_index;

// Re-export commonly used types
pub use ordered_index::{DuplicateIndex, IndexError, IndexSlot, UniqueIndex};
