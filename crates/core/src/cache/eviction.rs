//! Priority-ascending eviction

use tracing::{debug, error};

use super::store::EntryStore;

/// What one reclaim pass released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimOutcome {
    /// Entries evicted
    pub entries: usize,
    /// Buffer bytes released
    pub bytes: usize,
}

impl ReclaimOutcome {
    /// `true` if nothing was evicted.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

/// Evict lowest-priority entries until `target_bytes` are released or the
/// store is empty.
///
/// Whole entries only, so the result may overshoot the target by less than
/// one entry. A target of zero evicts nothing. Each evicted buffer is
/// dropped as soon as it leaves the store, returning it to the allocator
/// before the next entry is considered.
///
/// An index inconsistency stops the pass early; the bytes released so far
/// are still reported.
pub fn reclaim(store: &mut EntryStore, target_bytes: usize) -> ReclaimOutcome {
    let mut outcome = ReclaimOutcome::default();

    while outcome.bytes < target_bytes {
        match store.remove_lowest() {
            Ok(Some(entry)) => {
                outcome.entries += 1;
                outcome.bytes += entry.byte_len();
                debug!(
                    identifier = entry.identifier(),
                    priority = entry.priority(),
                    bytes = entry.byte_len(),
                    "evicted entry"
                );
            }
            Ok(None) => break,
            Err(err) => {
                error!(error = %err, freed = outcome.bytes, "eviction stopped on index error");
                break;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::eviction.
    use super::*;
    use crate::cache::entry::CacheEntry;

    fn store_with(entries: &[(i64, i64, usize)]) -> EntryStore {
        let mut store = EntryStore::new();
        for &(identifier, priority, elements) in entries {
            let data = vec![0.0; elements];
            store.insert(CacheEntry::copy_from(identifier, priority, elements, 1, &data).unwrap()).unwrap();
        }
        store
    }

    /// Validates reclaim on an empty store.
    #[test]
    fn test_reclaim_empty_store() {
        let mut store = EntryStore::new();
        let outcome = reclaim(&mut store, 1024);
        assert_eq!(outcome, ReclaimOutcome::default());
        assert!(outcome.is_empty());
    }

    /// Validates the lowest priority goes first.
    ///
    /// Assertions:
    /// - With priorities `[5, 1, 3]`, a one-byte target evicts priority 1.
    #[test]
    fn test_reclaim_lowest_priority_first() {
        let mut store = store_with(&[(10, 5, 1), (11, 1, 1), (12, 3, 1)]);

        let outcome = reclaim(&mut store, 1);
        assert_eq!(outcome, ReclaimOutcome { entries: 1, bytes: 8 });
        assert_eq!(store.identifiers(), vec![10, 12]);
    }

    /// Validates reclaim stops once the target is met, with whole-entry
    /// overshoot.
    #[test]
    fn test_reclaim_stops_at_target() {
        let mut store = store_with(&[(1, 0, 4), (2, 1, 4), (3, 2, 4)]);

        let outcome = reclaim(&mut store, 40);
        assert_eq!(outcome, ReclaimOutcome { entries: 2, bytes: 64 });
        assert_eq!(store.identifiers(), vec![3]);
        assert_eq!(store.resident_bytes(), 32);
    }

    /// Validates an oversized target drains the store.
    #[test]
    fn test_reclaim_drains_store() {
        let mut store = store_with(&[(1, 0, 1), (2, 0, 1)]);

        let outcome = reclaim(&mut store, usize::MAX);
        assert_eq!(outcome.entries, 2);
        assert!(store.is_empty());
    }

    /// Validates a zero target evicts nothing.
    #[test]
    fn test_reclaim_zero_target() {
        let mut store = store_with(&[(1, 0, 1)]);
        assert!(reclaim(&mut store, 0).is_empty());
        assert_eq!(store.len(), 1);
    }

    /// Validates an index inconsistency stops the pass without panicking.
    ///
    /// Assertions:
    /// - Entries evicted before the orphaned slot are reported.
    /// - Entries after it stay resident.
    /// - A later pass resumes past the consumed slot.
    #[test]
    fn test_reclaim_stops_on_orphaned_slot() {
        let mut store = store_with(&[(1, 0, 2), (2, 1, 3), (3, 2, 4)]);
        store.orphan_priority_slot(2).unwrap();

        let outcome = reclaim(&mut store, usize::MAX);
        assert_eq!(outcome, ReclaimOutcome { entries: 1, bytes: 16 });
        assert_eq!(store.identifiers(), vec![3]);
        assert_eq!(store.resident_bytes(), 32);

        let outcome = reclaim(&mut store, usize::MAX);
        assert_eq!(outcome, ReclaimOutcome { entries: 1, bytes: 32 });
        assert!(store.is_empty());
    }
}
