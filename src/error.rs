//! Error types for typelens
//!
//! Parse degradation is not an error: the analyzer always yields a
//! [`TypeNode`](crate::types::TypeNode), falling back to `Unknown`. The
//! variants below cover configuration and construction failures only.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the caching subsystem and its configuration layer
#[derive(Error, Debug)]
pub enum Error {
    /// The process-wide coordinator was configured twice without a reset
    #[error("Cache coordinator is already configured; call reset() before configuring again")]
    AlreadyConfigured,

    /// A cache was constructed with a capacity it cannot honor
    #[error("Invalid capacity {capacity} for cache '{cache}': capacity must be at least 1")]
    InvalidCapacity { cache: String, capacity: usize },

    /// Malformed declaration reference text
    #[error("Invalid declaration reference: {0}")]
    InvalidReference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Prometheus registry or encoding error
    #[error("Metrics export error: {0}")]
    Metrics(#[from] prometheus::Error),
}

// =============================================================================
// Tests
// =============================================================================
