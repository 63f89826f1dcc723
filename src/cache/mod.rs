//! Caching Layer
//!
//! Bounded, statistics-tracking memoization for the documentation pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                CacheCoordinator                │
//! │   ┌───────────────────┐ ┌───────────────────┐  │
//! │   │ TypeAnalysisCache │ │  ResolutionCache  │  │
//! │   └─────────┬─────────┘ └─────────┬─────────┘  │
//! │             └──────────┬──────────┘            │
//! │                 CacheEngine (LRU)              │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Every cache is safe to share between threads; all operations take
//! `&self`.

mod coordinator;
mod engine;
mod proptest;
mod resolution;
mod stats;
mod type_analysis;

pub use coordinator::{
    CacheCoordinator, CacheOptions, CacheSettings, Preset, DEFAULT_RESOLUTION_CAPACITY,
    DEFAULT_TYPE_ANALYSIS_CAPACITY,
};
pub use engine::CacheEngine;
pub use resolution::{
    ContextItem, ContextSegment, MemberReference, Navigation, ReferenceDescriptor,
    ResolutionCache, ResolutionKey, ResolutionResult, ResolvedItem, Resolver, RESOLUTION_CACHE,
};
pub use stats::{AggregatedStats, CacheStats};
pub use type_analysis::{normalize_signature, TypeAnalysisCache, TYPE_ANALYSIS_CACHE};
