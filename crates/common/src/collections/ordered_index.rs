#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

//! Ordered indexes keyed by signed integers, backed by
//! [`std::collections::BTreeMap`].
//!
//! Two variants are provided:
//! - [`UniqueIndex`]: at most one value per key; inserting an existing key is
//!   an error.
//! - [`DuplicateIndex`]: any number of values per key. Each insertion gets an
//!   [`IndexSlot`] that identifies it. Values sharing a key are ordered by
//!   insertion, so [`DuplicateIndex::first`] returns the earliest value of the
//!   smallest key.
//!
//! Both variants can be bounded with `with_capacity_limit`, in which case
//! insertion fails with [`IndexError::CapacityExhausted`] once the limit is
//! reached.
//!
//! # Complexity
//! - `try_insert`: `O(log n)`
//! - `get` / `remove`: `O(log n)`
//! - `first`: `O(log n)`
//!
//! # Examples
//! ```
//! use matcache_common::collections::{DuplicateIndex, UniqueIndex};
//!
//! let mut by_id = UniqueIndex::new();
//! by_id.try_insert(7, "seven").unwrap();
//! assert!(by_id.try_insert(7, "again").is_err());
//!
//! let mut by_rank = DuplicateIndex::new();
//! let a = by_rank.try_insert(3, 'a').unwrap();
//! by_rank.try_insert(1, 'b').unwrap();
//! by_rank.try_insert(1, 'c').unwrap();
//! assert_eq!(by_rank.first().map(|(_, v)| *v), Some('b'));
//! assert_eq!(by_rank.remove(a), Some('a'));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors reported by the ordered indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The key is already present in a unique index.
    #[error("key {key} already present in unique index")]
    DuplicateKey {
        /// The rejected key
        key: i64,
    },

    /// The index reached its configured capacity limit.
    #[error("index capacity of {capacity} entries exhausted")]
    CapacityExhausted {
        /// The configured limit
        capacity: usize,
    },

    /// A key expected to be present was missing.
    #[error("key {key} missing from index")]
    MissingKey {
        /// The missing key
        key: i64,
    },
}

/// Handle to one value stored in a [`DuplicateIndex`].
///
/// Orders by key, then by insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSlot {
    key: i64,
    sequence: u64,
}

impl IndexSlot {
    /// The key this slot was inserted under.
    #[must_use]
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Insertion sequence number, unique within the owning index.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

fn check_capacity(len: usize, limit: Option<usize>) -> Result<(), IndexError> {
    match limit {
        Some(capacity) if len >= capacity => Err(IndexError::CapacityExhausted { capacity }),
        _ => Ok(()),
    }
}

/// Ordered index that forbids duplicate keys.
pub struct UniqueIndex<V> {
    entries: BTreeMap<i64, V>,
    capacity_limit: Option<usize>,
}

impl<V> UniqueIndex<V> {
    /// Creates an empty, unbounded index.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: BTreeMap::new(), capacity_limit: None }
    }

    /// Creates an empty index that rejects inserts beyond `limit` entries.
    #[must_use]
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self { entries: BTreeMap::new(), capacity_limit: Some(limit) }
    }

    /// Inserts `value` under `key`.
    ///
    /// # Errors
    /// [`IndexError::DuplicateKey`] if `key` is present,
    /// [`IndexError::CapacityExhausted`] if the index is full. The value is
    /// dropped in both cases.
    pub fn try_insert(&mut self, key: i64, value: V) -> Result<(), IndexError> {
        if self.entries.contains_key(&key) {
            return Err(IndexError::DuplicateKey { key });
        }
        check_capacity(self.entries.len(), self.capacity_limit)?;
        self.entries.insert(key, value);
        Ok(())
    }

    /// Exact-key lookup.
    #[must_use]
    pub fn get(&self, key: i64) -> Option<&V> {
        self.entries.get(&key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: i64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(i64, &V)> {
        self.entries.first_key_value().map(|(k, v)| (*k, v))
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: i64) -> Option<V> {
        self.entries.remove(&key)
    }

    /// Iterates keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for UniqueIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for UniqueIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueIndex")
            .field("len", &self.len())
            .field("capacity_limit", &self.capacity_limit)
            .finish()
    }
}

/// Ordered index that allows duplicate keys.
pub struct DuplicateIndex<V> {
    entries: BTreeMap<IndexSlot, V>,
    next_sequence: u64,
    capacity_limit: Option<usize>,
}

impl<V> DuplicateIndex<V> {
    /// Creates an empty, unbounded index.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: BTreeMap::new(), next_sequence: 0, capacity_limit: None }
    }

    /// Creates an empty index that rejects inserts beyond `limit` entries.
    #[must_use]
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self { entries: BTreeMap::new(), next_sequence: 0, capacity_limit: Some(limit) }
    }

    /// Inserts `value` under `key` and returns the slot identifying it.
    ///
    /// # Errors
    /// [`IndexError::CapacityExhausted`] if the index is full.
    pub fn try_insert(&mut self, key: i64, value: V) -> Result<IndexSlot, IndexError> {
        check_capacity(self.entries.len(), self.capacity_limit)?;
        let slot = IndexSlot { key, sequence: self.next_sequence };
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.entries.insert(slot, value);
        Ok(slot)
    }

    /// Slot lookup.
    #[must_use]
    pub fn get(&self, slot: IndexSlot) -> Option<&V> {
        self.entries.get(&slot)
    }

    /// All values stored under `key`, in insertion order.
    pub fn find(&self, key: i64) -> impl Iterator<Item = (IndexSlot, &V)> + '_ {
        let start = IndexSlot { key, sequence: 0 };
        let end = IndexSlot { key, sequence: u64::MAX };
        self.entries.range(start..=end).map(|(slot, v)| (*slot, v))
    }

    /// Earliest-inserted value of the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(IndexSlot, &V)> {
        self.entries.first_key_value().map(|(slot, v)| (*slot, v))
    }

    /// Removes and returns the value at [`first`](Self::first).
    pub fn pop_first(&mut self) -> Option<(IndexSlot, V)> {
        self.entries.pop_first()
    }

    /// Removes the value stored at `slot`.
    pub fn remove(&mut self, slot: IndexSlot) -> Option<V> {
        self.entries.remove(&slot)
    }

    /// Iterates `(slot, value)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (IndexSlot, &V)> + '_ {
        self.entries.iter().map(|(slot, v)| (*slot, v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for DuplicateIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for DuplicateIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateIndex")
            .field("len", &self.len())
            .field("next_sequence", &self.next_sequence)
            .field("capacity_limit", &self.capacity_limit)
            .finish()
    }
}
