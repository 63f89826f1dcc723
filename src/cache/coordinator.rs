//! Cache Coordinator - Process-Wide Cache Owner
//!
//! Owns one [`TypeAnalysisCache`] and one [`ResolutionCache`] and hands them
//! out to callers. A single process-wide instance is kept in a registry:
//! [`CacheCoordinator::configure`] installs it once, [`CacheCoordinator::get`]
//! returns it (installing defaults on first use) and
//! [`CacheCoordinator::reset`] drops it so tests can start from scratch.
//!
//! Explicit instances built with [`CacheCoordinator::new`] never touch the
//! registry.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::resolution::{ResolutionCache, RESOLUTION_CACHE};
use super::stats::AggregatedStats;
use super::type_analysis::{TypeAnalysisCache, TYPE_ANALYSIS_CACHE};
use crate::error::{Error, Result};

/// Default type analysis capacity
pub const DEFAULT_TYPE_ANALYSIS_CAPACITY: NonZeroUsize = nonzero(1000);

/// Default resolution capacity
pub const DEFAULT_RESOLUTION_CAPACITY: NonZeroUsize = nonzero(500);

const fn nonzero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => panic!("capacity constant must be non-zero"),
    }
}

static REGISTRY: Lazy<RwLock<Option<Arc<CacheCoordinator>>>> = Lazy::new(|| RwLock::new(None));

// =============================================================================
// Options
// =============================================================================

fn default_enabled() -> bool {
    true
}

/// Settings for one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    /// Maximum number of entries
    pub max_size: usize,
    /// Disabled caches store nothing
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl CacheSettings {
    pub fn new(max_size: usize, enabled: bool) -> Self {
        Self { max_size, enabled }
    }
}

/// Settings for every cache the coordinator owns.
///
/// Missing sections fall back to the default preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    pub type_analysis: CacheSettings,
    pub resolution: CacheSettings,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Preset::Default.options()
    }
}

/// Named option sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// 1000 type trees, 500 resolutions
    #[default]
    Default,
    /// Small caches so eviction shows up quickly
    Development,
    /// Large caches for big documentation builds
    Production,
}

impl Preset {
    pub fn options(self) -> CacheOptions {
        let (type_analysis, resolution) = match self {
            Preset::Default => (
                DEFAULT_TYPE_ANALYSIS_CAPACITY.get(),
                DEFAULT_RESOLUTION_CAPACITY.get(),
            ),
            Preset::Development => (100, 50),
            Preset::Production => (10_000, 5_000),
        };

        CacheOptions {
            type_analysis: CacheSettings::new(type_analysis, true),
            resolution: CacheSettings::new(resolution, true),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Development => "development",
            Preset::Production => "production",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "development" | "dev" => Ok(Preset::Development),
            "production" | "prod" => Ok(Preset::Production),
            other => Err(Error::Config(format!("Unknown cache preset: {}", other))),
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Owner of the specialized caches
#[derive(Debug)]
pub struct CacheCoordinator {
    options: CacheOptions,
    type_analysis: TypeAnalysisCache,
    resolution: ResolutionCache,
}

impl CacheCoordinator {
    /// Build a standalone coordinator; zero capacities are rejected
    pub fn new(options: CacheOptions) -> Result<Self> {
        let type_analysis = TypeAnalysisCache::new(
            options.type_analysis.max_size,
            options.type_analysis.enabled,
        )?;
        let resolution =
            ResolutionCache::new(options.resolution.max_size, options.resolution.enabled)?;

        debug!(
            type_analysis = options.type_analysis.max_size,
            resolution = options.resolution.max_size,
            "Created cache coordinator"
        );

        Ok(Self {
            options,
            type_analysis,
            resolution,
        })
    }

    fn with_defaults() -> Self {
        Self {
            options: CacheOptions::default(),
            type_analysis: TypeAnalysisCache::with_capacity(DEFAULT_TYPE_ANALYSIS_CAPACITY, true),
            resolution: ResolutionCache::with_capacity(DEFAULT_RESOLUTION_CAPACITY, true),
        }
    }

    /// Install the process-wide coordinator.
    ///
    /// Fails with [`Error::AlreadyConfigured`] if one is installed already,
    /// including one auto-created by [`get`](Self::get).
    pub fn configure(options: CacheOptions) -> Result<Arc<Self>> {
        let mut slot = REGISTRY.write();
        if slot.is_some() {
            warn!("Rejected cache configuration: coordinator already configured");
            return Err(Error::AlreadyConfigured);
        }

        let coordinator = Arc::new(Self::new(options)?);
        *slot = Some(Arc::clone(&coordinator));

        info!(
            type_analysis = options.type_analysis.max_size,
            resolution = options.resolution.max_size,
            "Configured cache coordinator"
        );
        Ok(coordinator)
    }

    /// The process-wide coordinator, created with default options on first use
    pub fn get() -> Arc<Self> {
        if let Some(coordinator) = REGISTRY.read().as_ref() {
            return Arc::clone(coordinator);
        }

        let mut slot = REGISTRY.write();
        // Another thread may have won the race between the two locks
        if let Some(coordinator) = slot.as_ref() {
            return Arc::clone(coordinator);
        }

        let coordinator = Arc::new(Self::with_defaults());
        *slot = Some(Arc::clone(&coordinator));
        debug!("Auto-configured cache coordinator with defaults");
        coordinator
    }

    /// Drop the process-wide coordinator.
    ///
    /// Handles obtained earlier stay usable but are no longer shared.
    pub fn reset() {
        if REGISTRY.write().take().is_some() {
            debug!("Reset cache coordinator");
        }
    }

    /// Check if a process-wide coordinator is installed
    pub fn is_configured() -> bool {
        REGISTRY.read().is_some()
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn type_analysis(&self) -> &TypeAnalysisCache {
        &self.type_analysis
    }

    pub fn resolution(&self) -> &ResolutionCache {
        &self.resolution
    }

    /// Statistics for every owned cache
    pub fn aggregated_stats(&self) -> AggregatedStats {
        let mut caches = BTreeMap::new();
        caches.insert(TYPE_ANALYSIS_CACHE.to_string(), self.type_analysis.stats());
        caches.insert(RESOLUTION_CACHE.to_string(), self.resolution.stats());
        AggregatedStats::new(caches)
    }

    /// Clear every owned cache, counters included
    pub fn clear_all(&self) {
        self.type_analysis.clear();
        self.resolution.clear();
        info!("Cleared all caches");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::resolution::{ContextItem, Navigation, ReferenceDescriptor, ResolutionResult};
    use assert_matches::assert_matches;
    use serial_test::serial;

    #[test]
    fn test_presets() {
        let options = Preset::Default.options();
        assert_eq!(options.type_analysis.max_size, 1000);
        assert_eq!(options.resolution.max_size, 500);

        let options = Preset::Development.options();
        assert_eq!(options.type_analysis.max_size, 100);
        assert_eq!(options.resolution.max_size, 50);

        let options = Preset::Production.options();
        assert_eq!(options.type_analysis.max_size, 10_000);
        assert_eq!(options.resolution.max_size, 5_000);

        assert_eq!(CacheOptions::default(), Preset::Default.options());
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("prod".parse::<Preset>().unwrap(), Preset::Production);
        assert_eq!(" Development ".parse::<Preset>().unwrap(), Preset::Development);
        assert_matches!("huge".parse::<Preset>(), Err(Error::Config(_)));
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: CacheOptions =
            serde_json::from_str(r#"{ "resolution": { "maxSize": 7, "enabled": false } }"#)
                .unwrap();

        assert_eq!(options.type_analysis, Preset::Default.options().type_analysis);
        assert_eq!(options.resolution, CacheSettings::new(7, false));

        let settings: CacheSettings = serde_json::from_str(r#"{ "maxSize": 3 }"#).unwrap();
        assert!(settings.enabled);
    }

    #[test]
    fn test_new_rejects_zero_capacity() {
        let mut options = CacheOptions::default();
        options.resolution.max_size = 0;

        assert_matches!(
            CacheCoordinator::new(options),
            Err(Error::InvalidCapacity { cache, .. }) if cache == RESOLUTION_CACHE
        );
    }

    fn not_found(_: &ReferenceDescriptor, _: Option<&ContextItem>) -> ResolutionResult {
        ResolutionResult::failed("not found")
    }

    #[test]
    fn test_aggregated_stats_and_clear_all() {
        let coordinator = CacheCoordinator::new(Preset::Development.options()).unwrap();

        coordinator.type_analysis().get_or_compute("string[]");
        coordinator.type_analysis().get_or_compute("string[]");
        let descriptor = ReferenceDescriptor::new("pkg").member(Navigation::Exports, "Foo");
        coordinator
            .resolution()
            .get_or_resolve(&descriptor, None, &not_found);

        let stats = coordinator.aggregated_stats();
        assert_eq!(stats.caches.len(), 2);
        assert_eq!(stats.get(TYPE_ANALYSIS_CACHE).unwrap().hit_count, 1);
        assert_eq!(stats.get(RESOLUTION_CACHE).unwrap().miss_count, 1);
        assert_eq!(stats.get(RESOLUTION_CACHE).unwrap().max_size, 50);
        assert_eq!(stats.total_requests(), 3);

        coordinator.clear_all();
        let stats = coordinator.aggregated_stats();
        assert_eq!(stats.total_requests(), 0);
        assert!(stats.caches.values().all(|s| s.size == 0));
        assert_eq!(stats.get(TYPE_ANALYSIS_CACHE).unwrap().max_size, 100);
    }

    #[test]
    #[serial]
    fn test_configure_once() {
        CacheCoordinator::reset();

        let configured = CacheCoordinator::configure(Preset::Production.options()).unwrap();
        assert!(CacheCoordinator::is_configured());
        assert!(Arc::ptr_eq(&configured, &CacheCoordinator::get()));

        assert_matches!(
            CacheCoordinator::configure(Preset::Development.options()),
            Err(Error::AlreadyConfigured)
        );
        assert_eq!(CacheCoordinator::get().options().type_analysis.max_size, 10_000);

        CacheCoordinator::reset();
    }

    #[test]
    #[serial]
    fn test_get_auto_configures_defaults() {
        CacheCoordinator::reset();
        assert!(!CacheCoordinator::is_configured());

        let first = CacheCoordinator::get();
        let second = CacheCoordinator::get();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first.options(), CacheOptions::default());
        assert_eq!(first.type_analysis().stats().max_size, 1000);

        // Auto-created coordinators count as configured
        assert_matches!(
            CacheCoordinator::configure(CacheOptions::default()),
            Err(Error::AlreadyConfigured)
        );

        CacheCoordinator::reset();
    }

    #[test]
    #[serial]
    fn test_reset_allows_reconfigure() {
        CacheCoordinator::reset();

        let before = CacheCoordinator::configure(Preset::Development.options()).unwrap();
        before.type_analysis().get_or_compute("number");
        CacheCoordinator::reset();
        assert!(!CacheCoordinator::is_configured());

        let after = CacheCoordinator::configure(Preset::Production.options()).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.type_analysis().is_empty());
        // Old handles keep working
        assert_eq!(before.type_analysis().len(), 1);

        CacheCoordinator::reset();
    }

    #[test]
    #[serial]
    fn test_failed_configure_leaves_registry_empty() {
        CacheCoordinator::reset();

        let mut options = CacheOptions::default();
        options.type_analysis.max_size = 0;
        assert!(CacheCoordinator::configure(options).is_err());
        assert!(!CacheCoordinator::is_configured());
    }

    #[test]
    #[serial]
    fn test_concurrent_configure_single_winner() {
        use std::thread;

        CacheCoordinator::reset();

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| CacheCoordinator::configure(CacheOptions::default()).is_ok()))
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(winners, 1);
        CacheCoordinator::reset();
    }
}
