//! Descriptors for named data sources.
//!
//! These are immutable value objects describing where a source's data lives
//! on disk and, for WFS-backed sources, how to request it. They carry no
//! behaviour; the ingestion workflows consume them.

use std::path::{Path, PathBuf};

use crate::config::LayeredConfig;

/// Filesystem layout common to all data sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Unique identifier for the data source
    pub name: String,
    /// Directory where raw data is stored
    pub raw_dir: PathBuf,
    /// Directory where processed data is written
    pub processed_dir: PathBuf,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, raw_dir: PathBuf, processed_dir: PathBuf) -> Self {
        Self {
            name: name.into(),
            raw_dir,
            processed_dir,
        }
    }
}

/// A source retrieved from a WFS endpoint via GetFeature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfsSourceConfig {
    pub source: SourceConfig,
    /// Fully qualified WFS feature type name
    pub type_name: String,
    /// Name of the downloaded archive file
    pub archive_name: String,
}

/// The facilities CSV source
pub fn facilities(data_dir: &Path) -> SourceConfig {
    SourceConfig::new(
        "facilities",
        data_dir.join("raw"),
        data_dir.join("processed"),
    )
}

/// The FWA watershed groups polygon layer, served by the BC WFS endpoint
pub fn fwa_watershed_groups(data_dir: &Path) -> WfsSourceConfig {
    WfsSourceConfig {
        source: SourceConfig::new(
            "fwa_watershed_groups",
            data_dir.join("raw").join("watershed_groups"),
            data_dir.join("processed"),
        ),
        type_name: "WHSE_BASEMAPPING.FWA_WATERSHED_GROUPS_POLY".to_string(),
        archive_name: "watershed_groups.zip".to_string(),
    }
}

/// Build both source descriptors from the effective configuration
pub fn from_config(config: &LayeredConfig) -> (SourceConfig, WfsSourceConfig) {
    let data_dir = &config.data_dir.value;
    (facilities(data_dir), fwa_watershed_groups(data_dir))
}
