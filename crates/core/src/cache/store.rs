//! Dual-indexed entry storage
//!
//! [`EntryStore`] owns every cached entry and keeps two views over them:
//!
//! - `by_identifier`: unique identifier -> entry (duplicates rejected)
//! - `by_priority`: priority -> identifier (duplicates allowed, ordered by
//!   priority then insertion)
//!
//! Both views always hold the same set of entries. Inserts are
//! transactional: the priority slot is taken first and released again by a
//! guard if the identifier insert fails, so a half-inserted entry is never
//! observable.
//!
//! The store is not synchronized. [`MatrixCache`](super::MatrixCache) wraps
//! it in a single mutex.

use matcache_common::collections::{DuplicateIndex, IndexError, IndexSlot, UniqueIndex};
use tracing::debug;

use super::entry::CacheEntry;
use super::error::{CacheError, CacheResult};

/// An entry plus its position in the priority index.
#[derive(Debug)]
struct StoredEntry {
    slot: IndexSlot,
    entry: CacheEntry,
}

/// Removes a freshly taken priority slot unless committed.
struct PrioritySlotGuard<'a> {
    index: &'a mut DuplicateIndex<i64>,
    slot: Option<IndexSlot>,
}

impl PrioritySlotGuard<'_> {
    fn commit(mut self) {
        self.slot = None;
    }
}

impl Drop for PrioritySlotGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.index.remove(slot);
        }
    }
}

/// Owner of all cache entries and their two indexes.
#[derive(Debug, Default)]
pub struct EntryStore {
    by_identifier: UniqueIndex<StoredEntry>,
    by_priority: DuplicateIndex<i64>,
    resident_bytes: usize,
}

impl EntryStore {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose indexes refuse inserts past the given sizes.
    ///
    /// `None` leaves an index unbounded. Mostly useful to exercise the
    /// failure path of [`insert`](Self::insert).
    pub fn with_capacity_limits(
        identifier_limit: Option<usize>,
        priority_limit: Option<usize>,
    ) -> Self {
        Self {
            by_identifier: identifier_limit
                .map_or_else(UniqueIndex::new, UniqueIndex::with_capacity_limit),
            by_priority: priority_limit
                .map_or_else(DuplicateIndex::new, DuplicateIndex::with_capacity_limit),
            resident_bytes: 0,
        }
    }

    /// Insert `entry` into both indexes, or into neither.
    ///
    /// # Errors
    /// - [`CacheError::AlreadyExists`] if the identifier is live
    /// - [`CacheError::Index`] if either index refuses the insert
    ///
    /// The store is unchanged on error and the entry is dropped.
    pub fn insert(&mut self, entry: CacheEntry) -> CacheResult<()> {
        let identifier = entry.identifier();
        let bytes = entry.byte_len();

        if self.by_identifier.contains_key(identifier) {
            return Err(CacheError::AlreadyExists { identifier });
        }

        let slot = self.by_priority.try_insert(entry.priority(), identifier)?;
        let guard = PrioritySlotGuard { index: &mut self.by_priority, slot: Some(slot) };

        match self.by_identifier.try_insert(identifier, StoredEntry { slot, entry }) {
            Ok(()) => guard.commit(),
            Err(IndexError::DuplicateKey { .. }) => {
                return Err(CacheError::AlreadyExists { identifier });
            }
            Err(err) => {
                debug!(identifier, error = %err, "identifier insert failed, priority slot released");
                return Err(err.into());
            }
        }

        self.resident_bytes += bytes;
        Ok(())
    }

    /// Look up a live entry.
    pub fn get(&self, identifier: i64) -> Option<&CacheEntry> {
        self.by_identifier.get(identifier).map(|stored| &stored.entry)
    }

    pub fn contains(&self, identifier: i64) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    /// Remove one entry from both indexes.
    ///
    /// Returns `Ok(None)` if the identifier is not live.
    ///
    /// # Errors
    /// [`IndexError::MissingKey`] if the priority index had no slot for the
    /// entry. The entry is still removed from the identifier index.
    pub fn remove(&mut self, identifier: i64) -> Result<Option<CacheEntry>, IndexError> {
        let Some(StoredEntry { slot, entry }) = self.by_identifier.remove(identifier) else {
            return Ok(None);
        };
        self.resident_bytes -= entry.byte_len();

        if self.by_priority.remove(slot).is_none() {
            return Err(IndexError::MissingKey { key: slot.key() });
        }
        Ok(Some(entry))
    }

    /// Remove the entry with the lowest priority.
    ///
    /// Among equal priorities the earliest inserted goes first. Returns
    /// `Ok(None)` on an empty store.
    ///
    /// # Errors
    /// [`IndexError::MissingKey`] if the priority index pointed at an
    /// identifier that is not stored.
    pub fn remove_lowest(&mut self) -> Result<Option<CacheEntry>, IndexError> {
        let Some((_, identifier)) = self.by_priority.pop_first() else {
            return Ok(None);
        };

        let StoredEntry { entry, .. } =
            self.by_identifier.remove(identifier).ok_or(IndexError::MissingKey { key: identifier })?;
        self.resident_bytes -= entry.byte_len();
        Ok(Some(entry))
    }

    /// Drop every entry. Returns the bytes released.
    pub fn clear(&mut self) -> usize {
        let released = self.resident_bytes;
        self.by_identifier.clear();
        self.by_priority.clear();
        self.resident_bytes = 0;
        released
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    /// Sum of live buffer sizes in bytes.
    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    /// Live identifiers in ascending order.
    pub fn identifiers(&self) -> Vec<i64> {
        self.by_identifier.keys().collect()
    }

    /// Live identifiers in eviction order.
    pub fn eviction_order(&self) -> Vec<i64> {
        self.by_priority.iter().map(|(_, identifier)| *identifier).collect()
    }

    /// Verify both indexes describe the same set of entries.
    ///
    /// # Errors
    /// [`IndexError::MissingKey`] naming the first key found in one index
    /// but not matched in the other.
    pub fn check_consistency(&self) -> Result<(), IndexError> {
        for (slot, identifier) in self.by_priority.iter() {
            match self.by_identifier.get(*identifier) {
                Some(stored) if stored.slot == slot && stored.entry.priority() == slot.key() => {}
                _ => return Err(IndexError::MissingKey { key: *identifier }),
            }
        }

        for (identifier, stored) in self.by_identifier.keys().zip(self.by_identifier.values()) {
            if self.by_priority.get(stored.slot) != Some(&identifier) {
                return Err(IndexError::MissingKey { key: identifier });
            }
        }

        Ok(())
    }

    /// Drop an entry from the identifier index only, leaving its priority
    /// slot behind.
    #[cfg(test)]
    pub(crate) fn orphan_priority_slot(&mut self, identifier: i64) -> Option<CacheEntry> {
        let StoredEntry { entry, .. } = self.by_identifier.remove(identifier)?;
        self.resident_bytes -= entry.byte_len();
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::store.
    use super::*;

    fn entry(identifier: i64, priority: i64, elements: usize) -> CacheEntry {
        let data = vec![identifier as f64; elements];
        CacheEntry::copy_from(identifier, priority, 1, elements, &data).unwrap()
    }

    /// Validates insert places the entry in both indexes.
    #[test]
    fn test_insert_updates_both_indexes() {
        let mut store = EntryStore::new();
        store.insert(entry(1, 10, 4)).unwrap();
        store.insert(entry(2, 5, 2)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.resident_bytes(), 48);
        assert_eq!(store.identifiers(), vec![1, 2]);
        assert_eq!(store.eviction_order(), vec![2, 1]);
        store.check_consistency().unwrap();
    }

    /// Validates a duplicate identifier is rejected and the priority slot
    /// taken for it is released.
    ///
    /// Assertions:
    /// - Error is `AlreadyExists`.
    /// - The original entry is untouched.
    /// - The priority index holds one slot.
    #[test]
    fn test_duplicate_identifier_rolls_back() {
        let mut store = EntryStore::new();
        store.insert(entry(1, 10, 1)).unwrap();

        let err = store.insert(entry(1, 3, 8)).unwrap_err();
        assert_eq!(err, CacheError::AlreadyExists { identifier: 1 });
        assert_eq!(store.get(1).map(CacheEntry::priority), Some(10));
        assert_eq!(store.eviction_order(), vec![1]);
        assert_eq!(store.resident_bytes(), 8);
        store.check_consistency().unwrap();
    }

    /// Validates a duplicate identifier is reported as such even when the
    /// priority index is full.
    #[test]
    fn test_duplicate_identifier_with_full_priority_index() {
        let mut store = EntryStore::with_capacity_limits(None, Some(1));
        store.insert(entry(1, 0, 1)).unwrap();

        let err = store.insert(entry(1, 2, 1)).unwrap_err();
        assert_eq!(err, CacheError::AlreadyExists { identifier: 1 });
        assert_eq!(store.eviction_order(), vec![1]);
        store.check_consistency().unwrap();
    }

    /// Validates an orphaned priority slot surfaces as `MissingKey` from
    /// `remove_lowest` and is consumed by it.
    #[test]
    fn test_remove_lowest_orphaned_slot() {
        let mut store = EntryStore::new();
        store.insert(entry(1, 0, 1)).unwrap();
        store.insert(entry(2, 1, 1)).unwrap();
        store.orphan_priority_slot(1).unwrap();
        assert_eq!(store.check_consistency(), Err(IndexError::MissingKey { key: 1 }));

        assert_eq!(store.remove_lowest().unwrap_err(), IndexError::MissingKey { key: 1 });
        assert_eq!(store.remove_lowest().unwrap().map(|e| e.identifier()), Some(2));
        assert!(store.is_empty());
    }

    /// Validates identifier-index exhaustion leaves no priority slot behind.
    #[test]
    fn test_identifier_capacity_failure_rolls_back() {
        let mut store = EntryStore::with_capacity_limits(Some(1), None);
        store.insert(entry(1, 0, 1)).unwrap();

        let err = store.insert(entry(2, -5, 1)).unwrap_err();
        assert_eq!(err, CacheError::Index(IndexError::CapacityExhausted { capacity: 1 }));
        assert_eq!(store.eviction_order(), vec![1]);
        store.check_consistency().unwrap();
    }

    /// Validates priority-index exhaustion fails before anything is inserted.
    #[test]
    fn test_priority_capacity_failure() {
        let mut store = EntryStore::with_capacity_limits(None, Some(0));

        let err = store.insert(entry(1, 0, 1)).unwrap_err();
        assert!(matches!(err, CacheError::Index(IndexError::CapacityExhausted { .. })));
        assert!(store.is_empty());
        assert_eq!(store.resident_bytes(), 0);
    }

    /// Validates lowest-priority removal with insertion-order tie-break.
    #[test]
    fn test_remove_lowest_order() {
        let mut store = EntryStore::new();
        for (identifier, priority) in [(1, 3), (2, 1), (3, 1), (4, 2)] {
            store.insert(entry(identifier, priority, 1)).unwrap();
        }

        let order: Vec<i64> = std::iter::from_fn(|| store.remove_lowest().unwrap())
            .map(|e| e.identifier())
            .collect();
        assert_eq!(order, vec![2, 3, 4, 1]);
        assert!(store.is_empty());
        assert_eq!(store.resident_bytes(), 0);
    }

    /// Validates explicit removal by identifier.
    #[test]
    fn test_remove_by_identifier() {
        let mut store = EntryStore::new();
        store.insert(entry(1, 0, 2)).unwrap();
        store.insert(entry(2, 0, 3)).unwrap();

        let removed = store.remove(1).unwrap().unwrap();
        assert_eq!(removed.byte_len(), 16);
        assert!(store.remove(1).unwrap().is_none());
        assert_eq!(store.eviction_order(), vec![2]);
        assert_eq!(store.resident_bytes(), 24);
        store.check_consistency().unwrap();
    }

    /// Validates clear empties both indexes and reports released bytes.
    #[test]
    fn test_clear() {
        let mut store = EntryStore::new();
        store.insert(entry(1, 0, 2)).unwrap();
        store.insert(entry(2, 1, 1)).unwrap();

        assert_eq!(store.clear(), 24);
        assert!(store.is_empty());
        assert!(store.eviction_order().is_empty());
        assert!(store.remove_lowest().unwrap().is_none());
    }
}
