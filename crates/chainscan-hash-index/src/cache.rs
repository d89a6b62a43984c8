//! Bounded write-back caches feeding the persistent store.

use std::collections::HashMap;
use std::hash::Hash;

/// A bounded in-memory hash → number accumulator.
///
/// Entries pile up until the cache reaches capacity; the owner then drains
/// the whole cache into one bulk insert and starts over. There is no
/// eviction and no time-based flushing, so between flushes the cache holds
/// the most recent not-yet-persisted mappings.
#[derive(Debug)]
pub struct WriteBackCache<K> {
    entries: HashMap<K, u32>,
    capacity: usize,
}

impl<K: Eq + Hash> WriteBackCache<K> {
    /// An empty cache holding `capacity` entries before filling up.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Record a mapping.
    ///
    /// Upstream dedup guarantees a hash maps to exactly one number, so a
    /// re-insert must carry the same value; a conflicting value means the
    /// index is being corrupted and asserts.
    pub fn insert(&mut self, key: K, value: u32) {
        if let Some(previous) = self.entries.insert(key, value) {
            assert_eq!(
                previous, value,
                "hash is already mapped to a different number"
            );
        }
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Drain every entry for a bulk insert, leaving the cache empty.
    pub fn drain_rows(&mut self) -> Vec<(K, u32)> {
        self.entries.drain().collect()
    }
}
