use crate::error::{BasinlinkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Root directory for raw and processed data
    pub data_dir: ConfigValue<PathBuf>,
    /// CRS token assumed for sources that carry none (bare CSV coordinates)
    pub default_crs: ConfigValue<String>,
    /// Base URL of the WFS endpoint serving the watershed layer
    pub wfs_base_url: ConfigValue<String>,
    /// WFS protocol version used for GetFeature requests
    pub wfs_version: ConfigValue<String>,
    /// Whether archive extraction may overwrite pre-existing files
    pub overwrite: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data_dir: ConfigValue::new(PathBuf::from("data"), ConfigSource::Default),
            default_crs: ConfigValue::new("EPSG:4326".to_string(), ConfigSource::Default),
            wfs_base_url: ConfigValue::new(
                "https://openmaps.gov.bc.ca/geo/pub/ows".to_string(),
                ConfigSource::Default,
            ),
            wfs_version: ConfigValue::new("2.0.0".to_string(), ConfigSource::Default),
            overwrite: ConfigValue::new(true, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| BasinlinkError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| BasinlinkError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(data_dir) = file_config.data_dir {
            self.data_dir.update(data_dir, ConfigSource::File);
        }

        if let Some(default_crs) = file_config.default_crs {
            self.default_crs.update(default_crs, ConfigSource::File);
        }

        if let Some(wfs_base_url) = file_config.wfs_base_url {
            self.wfs_base_url.update(wfs_base_url, ConfigSource::File);
        }

        if let Some(wfs_version) = file_config.wfs_version {
            self.wfs_version.update(wfs_version, ConfigSource::File);
        }

        if let Some(overwrite) = file_config.overwrite {
            self.overwrite.update(overwrite, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // BASINLINK_DATA_DIR
        if let Ok(data_dir) = env::var("BASINLINK_DATA_DIR") {
            self.data_dir
                .update(PathBuf::from(data_dir), ConfigSource::Environment);
        }

        // BASINLINK_DEFAULT_CRS
        if let Ok(crs) = env::var("BASINLINK_DEFAULT_CRS") {
            self.default_crs.update(crs, ConfigSource::Environment);
        }

        // BASINLINK_WFS_BASE_URL
        if let Ok(url) = env::var("BASINLINK_WFS_BASE_URL") {
            self.wfs_base_url.update(url, ConfigSource::Environment);
        }

        // BASINLINK_WFS_VERSION
        if let Ok(version) = env::var("BASINLINK_WFS_VERSION") {
            self.wfs_version.update(version, ConfigSource::Environment);
        }

        // BASINLINK_OVERWRITE
        if let Ok(overwrite_str) = env::var("BASINLINK_OVERWRITE") {
            match overwrite_str.parse::<bool>() {
                Ok(overwrite) => self.overwrite.update(overwrite, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid BASINLINK_OVERWRITE value '{}': expected true or false",
                    overwrite_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }

        if let Some(default_crs) = overrides.default_crs {
            self.default_crs.update(default_crs, ConfigSource::Cli);
        }

        if let Some(wfs_base_url) = overrides.wfs_base_url {
            self.wfs_base_url.update(wfs_base_url, ConfigSource::Cli);
        }

        if let Some(overwrite) = overrides.overwrite {
            self.overwrite.update(overwrite, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "data_dir".to_string(),
            (
                self.data_dir.value.display().to_string(),
                self.data_dir.source,
            ),
        );

        map.insert(
            "default_crs".to_string(),
            (self.default_crs.value.clone(), self.default_crs.source),
        );

        map.insert(
            "wfs_base_url".to_string(),
            (self.wfs_base_url.value.clone(), self.wfs_base_url.source),
        );

        map.insert(
            "wfs_version".to_string(),
            (self.wfs_version.value.clone(), self.wfs_version.source),
        );

        map.insert(
            "overwrite".to_string(),
            (self.overwrite.value.to_string(), self.overwrite.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    default_crs: Option<String>,
    wfs_base_url: Option<String>,
    wfs_version: Option<String>,
    overwrite: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub default_crs: Option<String>,
    pub wfs_base_url: Option<String>,
    pub overwrite: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.data_dir.value, PathBuf::from("data"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.default_crs.value, "EPSG:4326");
        assert_eq!(config.wfs_version.value, "2.0.0");
        assert!(config.overwrite.value);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/basinlink/data"
default_crs = "EPSG:3005"
wfs_base_url = "https://example.org/geo/ows"
overwrite = false
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults()
            .load_from_file(file.path())
            .unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/srv/basinlink/data"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.default_crs.value, "EPSG:3005");
        assert_eq!(config.wfs_base_url.value, "https://example.org/geo/ows");
        assert!(!config.overwrite.value);
        // Untouched key keeps its default
        assert_eq!(config.wfs_version.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            data_dir: Some(PathBuf::from("/tmp/data")),
            default_crs: Some("EPSG:3857".to_string()),
            wfs_base_url: None,
            overwrite: Some(false),
        };

        config.update_from_cli(overrides);

        assert_eq!(config.data_dir.value, PathBuf::from("/tmp/data"));
        assert_eq!(config.data_dir.source, ConfigSource::Cli);
        assert_eq!(config.default_crs.value, "EPSG:3857");
        assert!(!config.overwrite.value);
        // These should still be defaults
        assert_eq!(config.wfs_base_url.source, ConfigSource::Default);
        assert_eq!(config.wfs_version.source, ConfigSource::Default);
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("data_dir"));
        assert!(map.contains_key("default_crs"));
        assert!(map.contains_key("wfs_base_url"));
        assert!(map.contains_key("wfs_version"));
        assert!(map.contains_key("overwrite"));

        let (crs_value, crs_source) = &map["default_crs"];
        assert_eq!(crs_value, "EPSG:4326");
        assert_eq!(*crs_source, ConfigSource::Default);
    }
}
