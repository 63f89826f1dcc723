//! Cache Statistics
//!
//! Per-cache snapshots plus the aggregated view used for developer
//! diagnostics. Hit rates are always derived from the counters, never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use prometheus::{GaugeVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// Snapshot of one cache's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Lookups that found an entry
    pub hit_count: u64,
    /// Lookups that found nothing
    pub miss_count: u64,
    /// Entries dropped to make room for new keys
    pub eviction_count: u64,
    /// Whether the cache stores anything at all
    pub enabled: bool,
}

impl CacheStats {
    /// Total lookups
    pub fn requests(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Hit ratio (0.0 - 1.0); 0.0 when no lookups happened
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hit_count, self.requests())
    }

    /// Fill level (0.0 - 1.0)
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.size as f64 / self.max_size as f64
        }
    }

    /// JSON view including the derived rates
    pub fn to_json(&self) -> Value {
        json!({
            "size": self.size,
            "maxSize": self.max_size,
            "hitCount": self.hit_count,
            "missCount": self.miss_count,
            "evictionCount": self.eviction_count,
            "enabled": self.enabled,
            "hitRate": self.hit_rate(),
        })
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Statistics for every cache owned by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStats {
    /// Per-cache snapshots, keyed by cache name
    pub caches: BTreeMap<String, CacheStats>,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

impl AggregatedStats {
    pub fn new(caches: BTreeMap<String, CacheStats>) -> Self {
        Self {
            caches,
            captured_at: Utc::now(),
        }
    }

    /// Snapshot for one cache
    pub fn get(&self, name: &str) -> Option<&CacheStats> {
        self.caches.get(name)
    }

    pub fn total_hits(&self) -> u64 {
        self.caches.values().map(|s| s.hit_count).sum()
    }

    pub fn total_misses(&self) -> u64 {
        self.caches.values().map(|s| s.miss_count).sum()
    }

    pub fn total_requests(&self) -> u64 {
        self.total_hits() + self.total_misses()
    }

    pub fn total_evictions(&self) -> u64 {
        self.caches.values().map(|s| s.eviction_count).sum()
    }

    /// Total hits over total lookups across all caches.
    ///
    /// Busy caches weigh more than idle ones; this is not an average of
    /// per-cache rates.
    pub fn combined_hit_rate(&self) -> f64 {
        ratio(self.total_hits(), self.total_requests())
    }

    /// JSON view including the derived rates
    pub fn to_json(&self) -> Value {
        let caches: serde_json::Map<String, Value> = self
            .caches
            .iter()
            .map(|(name, stats)| (name.clone(), stats.to_json()))
            .collect();

        json!({
            "capturedAt": self.captured_at.to_rfc3339(),
            "caches": caches,
            "totalHits": self.total_hits(),
            "totalMisses": self.total_misses(),
            "combinedHitRate": self.combined_hit_rate(),
        })
    }

    /// Render the snapshot in the Prometheus text exposition format
    pub fn to_prometheus_text(&self) -> Result<String> {
        let registry = Registry::new_custom(Some("typelens".to_string()), None)?;

        let entries = IntGaugeVec::new(
            Opts::new("cache_entries", "Entries currently held by the cache"),
            &["cache"],
        )?;
        let capacity = IntGaugeVec::new(
            Opts::new("cache_capacity", "Configured maximum number of entries"),
            &["cache"],
        )?;
        let hits = IntCounterVec::new(Opts::new("cache_hits_total", "Cache hits"), &["cache"])?;
        let misses =
            IntCounterVec::new(Opts::new("cache_misses_total", "Cache misses"), &["cache"])?;
        let evictions = IntCounterVec::new(
            Opts::new("cache_evictions_total", "Entries evicted to make room"),
            &["cache"],
        )?;
        let hit_ratio = GaugeVec::new(
            Opts::new("cache_hit_ratio", "Hits over lookups (0.0 - 1.0)"),
            &["cache"],
        )?;

        registry.register(Box::new(entries.clone()))?;
        registry.register(Box::new(capacity.clone()))?;
        registry.register(Box::new(hits.clone()))?;
        registry.register(Box::new(misses.clone()))?;
        registry.register(Box::new(evictions.clone()))?;
        registry.register(Box::new(hit_ratio.clone()))?;

        for (name, stats) in &self.caches {
            let name = name.as_str();
            entries.with_label_values(&[name]).set(stats.size as i64);
            capacity.with_label_values(&[name]).set(stats.max_size as i64);
            hits.with_label_values(&[name]).inc_by(stats.hit_count);
            misses.with_label_values(&[name]).inc_by(stats.miss_count);
            evictions.with_label_values(&[name]).inc_by(stats.eviction_count);
            hit_ratio.with_label_values(&[name]).set(stats.hit_rate());
        }

        Ok(TextEncoder::new().encode_to_string(&registry.gather())?)
    }
}

// =============================================================================
// Tests
// =============================================================================
