//! typelens - Type Signature Analysis and Caching for Documentation Tooling
//!
//! Turns the textual type signatures found in API documentation into
//! structured trees, attaches property descriptions to them, and memoizes
//! both signature analysis and cross-reference resolution in bounded LRU
//! caches owned by a single coordinator.
//!
//! # Architecture
//!
//! ```text
//! signature text ─▶ analyze ─▶ TypeNode ─▶ enrich ─▶ documented TypeNode
//!                      │
//!                      ▼
//!              TypeAnalysisCache ─┐
//!              ResolutionCache  ──┴─▶ CacheCoordinator ─▶ AggregatedStats
//! ```
//!
//! # Modules
//!
//! - [`types`] - Type signature parser, tree model and description enrichment
//! - [`cache`] - LRU engine, specialized caches and the coordinator
//! - [`config`] - Cache option files (JSON/YAML)
//! - [`error`] - Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use cache::{
    AggregatedStats, CacheCoordinator, CacheOptions, CacheStats, Preset, ResolutionCache,
    TypeAnalysisCache,
};
pub use error::{Error, Result};
pub use types::{analyze, enrich, DescriptionLookup, Primitive, PropertyNode, TypeNode};
