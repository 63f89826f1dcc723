//! Type Analysis Cache
//!
//! Memoizes parsed type trees keyed by the whitespace-normalized signature,
//! so cosmetically different spellings of one signature share an entry.

use std::num::NonZeroUsize;
use std::sync::Arc;

use super::engine::CacheEngine;
use super::stats::CacheStats;
use crate::error::Result;
use crate::types::{analyze, collapse_whitespace, enrich, DescriptionLookup, TypeNode};

/// Name reported in statistics
pub const TYPE_ANALYSIS_CACHE: &str = "typeAnalysis";

/// Cache key for a raw type signature: whitespace runs collapsed, ends trimmed
pub fn normalize_signature(signature: &str) -> String {
    collapse_whitespace(signature)
}

/// Signature → parsed tree cache
#[derive(Debug)]
pub struct TypeAnalysisCache {
    engine: CacheEngine<String, Arc<TypeNode>>,
}

impl TypeAnalysisCache {
    /// Create a cache holding at most `capacity` trees
    pub fn new(capacity: usize, enabled: bool) -> Result<Self> {
        Ok(Self {
            engine: CacheEngine::new(TYPE_ANALYSIS_CACHE, capacity, enabled)?,
        })
    }

    /// Create a cache from an already validated capacity
    pub fn with_capacity(capacity: NonZeroUsize, enabled: bool) -> Self {
        Self {
            engine: CacheEngine::with_capacity(TYPE_ANALYSIS_CACHE, capacity, enabled),
        }
    }

    /// Cached tree for a signature
    pub fn get(&self, signature: &str) -> Option<Arc<TypeNode>> {
        self.engine.get(normalize_signature(signature).as_str())
    }

    /// Store a tree for a signature
    pub fn set(&self, signature: &str, node: TypeNode) {
        self.engine.set(normalize_signature(signature), Arc::new(node));
    }

    /// Cached tree for a signature, analyzing and storing it on a miss
    pub fn get_or_compute(&self, signature: &str) -> Arc<TypeNode> {
        let key = normalize_signature(signature);
        if let Some(node) = self.engine.get(key.as_str()) {
            return node;
        }

        let node = Arc::new(analyze(&key));
        self.engine.set(key, Arc::clone(&node));
        node
    }

    /// Analyze through the cache, then attach descriptions under `base_path`.
    ///
    /// The cached tree stays description-free; the enriched tree is a copy.
    pub fn analyze_enriched<L>(&self, signature: &str, base_path: &str, lookup: &L) -> TypeNode
    where
        L: DescriptionLookup + ?Sized,
    {
        let node = self.get_or_compute(signature);
        enrich(&node, base_path, lookup)
    }

    pub fn clear(&self) {
        self.engine.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
