//! Cache Engine - Bounded LRU Core
//!
//! Generic key→value store shared by every specialized cache.
//!
//! # Design
//!
//! - Strict entry bound: never more than `capacity` entries
//! - Least-recently-used eviction; `get` and overwrite both promote
//! - Hit/miss/eviction counters reset only by `clear()`
//! - Entries and counters share one lock, so promotion, evict-then-insert
//!   and clear are single critical sections and `stats()` is a consistent
//!   snapshot

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::stats::CacheStats;
use crate::error::{Error, Result};

/// Entries plus the counters that describe them
struct EngineState<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded LRU cache with hit/miss/eviction accounting
pub struct CacheEngine<K: Hash + Eq, V> {
    /// Name used in logs, errors and aggregated statistics
    name: String,
    /// Maximum number of entries
    capacity: NonZeroUsize,
    /// Disabled engines store nothing and always miss
    enabled: bool,
    state: Mutex<EngineState<K, V>>,
}

impl<K: Hash + Eq, V: Clone> CacheEngine<K, V> {
    /// Create a new engine.
    ///
    /// A capacity of zero is rejected with [`Error::InvalidCapacity`].
    pub fn new(name: impl Into<String>, capacity: usize, enabled: bool) -> Result<Self> {
        let name = name.into();
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Ok(Self::with_capacity(name, capacity, enabled)),
            None => Err(Error::InvalidCapacity {
                cache: name,
                capacity,
            }),
        }
    }

    /// Create a new engine from an already validated capacity
    pub fn with_capacity(name: impl Into<String>, capacity: NonZeroUsize, enabled: bool) -> Self {
        Self {
            name: name.into(),
            capacity,
            enabled,
            state: Mutex::new(EngineState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    /// Get a value, promoting it to most recently used on hit
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.enabled {
            return None;
        }

        let mut state = self.state.lock();
        let value = state.entries.get(key).cloned();
        match value {
            Some(value) => {
                state.hits += 1;
                Some(value)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite a value.
    ///
    /// Overwriting promotes the entry and never evicts. Inserting a new key
    /// into a full engine first evicts the least recently used entry.
    pub fn set(&self, key: K, value: V) {
        if !self.enabled {
            return;
        }

        let mut state = self.state.lock();
        if !state.entries.contains(&key) && state.entries.len() == self.capacity.get() {
            if state.entries.pop_lru().is_some() {
                state.evictions += 1;
                trace!(cache = %self.name, evictions = state.evictions, "Evicted least recently used entry");
            }
        }
        state.entries.put(key, value);
    }

    /// Read a value without promoting it or touching the counters
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().entries.peek(key).cloned()
    }

    /// Check if the engine holds a key (no promotion, no counters)
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().entries.contains(key)
    }

    /// Remove an entry; removal is not an eviction
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().entries.pop(key)
    }

    /// Drop every entry and reset the counters.
    ///
    /// Capacity and the enabled flag are unchanged.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        state.evictions = 0;
        debug!(cache = %self.name, dropped, "Cleared cache");
    }

    /// Snapshot of the current statistics
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            size: state.entries.len(),
            max_size: self.capacity.get(),
            hit_count: state.hits,
            miss_count: state.misses,
            eviction_count: state.evictions,
            enabled: self.enabled,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the engine is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for CacheEngine<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEngine")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("enabled", &self.enabled)
            .field("size", &self.state.lock().entries.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
