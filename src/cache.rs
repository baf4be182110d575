//! Bounded key/value cache with least-recently-used eviction.
//!
//! Recency is tracked with a monotonically increasing access counter rather
//! than wall-clock timestamps, so two accesses are always ordered by call
//! order.

use std::collections::BTreeMap;
use std::hash::Hash;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellGuardError};

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of `get` calls that found a value.
    pub hits: u64,
    /// Number of `get` calls that found nothing.
    pub misses: u64,
    /// Number of entries dropped to make room.
    pub evictions: u64,
    /// Current number of entries.
    pub size: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A fixed-capacity cache that evicts the least-recently-used entry.
///
/// A capacity of zero is allowed at construction and turns every `put` into
/// a no-op. Reconfiguring through [`LruCache::set_capacity`] requires a
/// capacity of at least one.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    /// Key -> (value, recency tick)
    entries: AHashMap<K, (V, u64)>,
    /// Recency tick -> key, oldest first
    order: BTreeMap<u64, K>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        LruCache {
            capacity,
            entries: AHashMap::with_capacity(capacity.min(1024)),
            order: BTreeMap::new(),
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Get a value and mark its key as most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let tick = self.tick + 1;
        match self.entries.get_mut(key) {
            Some((value, last)) => {
                let previous = std::mem::replace(last, tick);
                let value = value.clone();
                self.tick = tick;
                if let Some(k) = self.order.remove(&previous) {
                    self.order.insert(tick, k);
                }
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite a value, evicting the least-recently-used entry
    /// when a new key arrives at a full cache.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let tick = self.next_tick();
        if let Some((old_value, last)) = self.entries.get_mut(&key) {
            *old_value = value;
            let previous = std::mem::replace(last, tick);
            self.order.remove(&previous);
            self.order.insert(tick, key);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.order.insert(tick, key.clone());
        self.entries.insert(key, (value, tick));
    }

    /// Membership check. Does not affect recency.
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, returning whether one was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some((_, tick)) => {
                self.order.remove(&tick);
                true
            }
            None => false,
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting least-recently-used entries until the
    /// cache fits.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < 1 {
            return Err(SpellGuardError::invalid_argument(format!(
                "cache capacity must be at least 1, got {capacity}"
            )));
        }

        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
        Ok(())
    }

    /// Keys ordered from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.order.values().cloned().collect()
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            size: self.entries.len(),
            capacity: self.capacity,
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.order.pop_first() {
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }
}
