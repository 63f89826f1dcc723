//! Cache option files
//!
//! Options may be stored as JSON (`.json`) or YAML (`.yaml`, `.yml`), using
//! the same camelCase field names as the serialized [`CacheOptions`]:
//!
//! ```yaml
//! typeAnalysis:
//!   maxSize: 2000
//! resolution:
//!   maxSize: 800
//!   enabled: false
//! ```

use std::path::Path;

use tracing::debug;

use crate::cache::CacheOptions;
use crate::error::{Error, Result};

/// Supported option file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            _ => Err(Error::Config(format!(
                "Unsupported config file '{}': expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }
}

/// Parse options from text in the given format
pub fn parse_options(text: &str, format: ConfigFormat) -> Result<CacheOptions> {
    let options = match format {
        ConfigFormat::Json => serde_json::from_str(text)?,
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(options)
}

/// Load options from a file; the extension decides the format
pub fn load_options(path: impl AsRef<Path>) -> Result<CacheOptions> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let options = parse_options(&text, format)?;

    debug!(
        path = %path.display(),
        type_analysis = options.type_analysis.max_size,
        resolution = options.resolution.max_size,
        "Loaded cache options"
    );
    Ok(options)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, Preset};
    use assert_matches::assert_matches;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/cache.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("cache.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("cache.yaml")).unwrap(), ConfigFormat::Yaml);
        assert_matches!(ConfigFormat::from_path(Path::new("cache.toml")), Err(Error::Config(_)));
        assert_matches!(ConfigFormat::from_path(Path::new("cache")), Err(Error::Config(_)));
    }

    #[test]
    fn test_parse_yaml() {
        let text = "typeAnalysis:\n  maxSize: 2000\nresolution:\n  maxSize: 800\n  enabled: false\n";
        let options = parse_options(text, ConfigFormat::Yaml).unwrap();

        assert_eq!(options.type_analysis, CacheSettings::new(2000, true));
        assert_eq!(options.resolution, CacheSettings::new(800, false));
    }

    #[test]
    fn test_parse_json_partial() {
        let options = parse_options(r#"{ "typeAnalysis": { "maxSize": 5 } }"#, ConfigFormat::Json)
            .unwrap();

        assert_eq!(options.type_analysis.max_size, 5);
        assert_eq!(options.resolution, Preset::Default.options().resolution);
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse_options("{", ConfigFormat::Json), Err(Error::Json(_)));
        assert_matches!(
            parse_options("typeAnalysis: [1, 2]", ConfigFormat::Yaml),
            Err(Error::Yaml(_))
        );
    }

    #[test]
    fn test_load_options_from_file() {
        let path = std::env::temp_dir().join(format!("typelens-options-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "resolution": { "maxSize": 9 } }"#).unwrap();

        let options = load_options(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(options.resolution.max_size, 9);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("typelens-definitely-missing.yaml");
        assert_matches!(load_options(path), Err(Error::Io(_)));
    }
}
