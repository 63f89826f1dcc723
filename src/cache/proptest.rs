//! Property-Based Tests for the Cache Engine
//!
//! # Test Properties
//!
//! 1. **Bounded Size**: the engine never holds more than its capacity
//! 2. **Counter Consistency**: hits + misses equals the number of lookups
//! 3. **LRU Model**: the engine agrees with a naive recency-list model

#![cfg(test)]

use proptest::prelude::*;

use super::engine::CacheEngine;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, u32),
    Get(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space keeps hits, overwrites and evictions all likely
    prop_oneof![
        (0u8..12, any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
        (0u8..12).prop_map(Op::Get),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..200)
}

/// Recency list, least recently used first
#[derive(Default)]
struct Model {
    entries: Vec<(u8, u32)>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.entries.push(entry);
                self.hits += 1;
                Some(entry.1)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn set(&mut self, key: u8, value: u32) {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        } else if self.entries.len() == self.capacity {
            self.entries.remove(0);
            self.evictions += 1;
        }
        self.entries.push((key, value));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: size never exceeds capacity after any operation.
    #[test]
    fn prop_size_bounded(capacity in 1usize..8, ops in ops_strategy()) {
        let engine = CacheEngine::new("prop", capacity, true)?;
        for op in ops {
            match op {
                Op::Set(k, v) => engine.set(k, v),
                Op::Get(k) => { engine.get(&k); }
            }
            prop_assert!(engine.len() <= capacity);
        }
    }

    /// Property: every lookup is counted exactly once.
    #[test]
    fn prop_counters_match_lookups(capacity in 1usize..8, ops in ops_strategy()) {
        let engine = CacheEngine::new("prop", capacity, true)?;
        let mut lookups = 0u64;
        for op in ops {
            match op {
                Op::Set(k, v) => engine.set(k, v),
                Op::Get(k) => {
                    engine.get(&k);
                    lookups += 1;
                }
            }
        }

        let stats = engine.stats();
        prop_assert_eq!(stats.hit_count + stats.miss_count, lookups);
        prop_assert!(stats.hit_rate() >= 0.0 && stats.hit_rate() <= 1.0);
    }

    /// Property: lookups, contents and counters follow strict LRU.
    #[test]
    fn prop_matches_lru_model(capacity in 1usize..6, ops in ops_strategy()) {
        let engine = CacheEngine::new("prop", capacity, true)?;
        let mut model = Model::new(capacity);

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    engine.set(k, v);
                    model.set(k, v);
                }
                Op::Get(k) => prop_assert_eq!(engine.get(&k), model.get(k)),
            }
        }

        for (key, value) in &model.entries {
            prop_assert_eq!(engine.peek(key), Some(*value));
        }
        let stats = engine.stats();
        prop_assert_eq!(stats.size, model.entries.len());
        prop_assert_eq!(stats.hit_count, model.hits);
        prop_assert_eq!(stats.miss_count, model.misses);
        prop_assert_eq!(stats.eviction_count, model.evictions);
    }
}
