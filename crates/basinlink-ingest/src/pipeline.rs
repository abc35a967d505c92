//! Named-dataset ingestion workflows.
//!
//! One function per dataset, each completing ingestion end to end: fetch or
//! locate the raw file, convert it, and write the processed GeoJSON. The
//! workflows are thin sequencers; errors from the collaborators they call
//! propagate unchanged.

use std::path::PathBuf;

use basinlink_core::config::LayeredConfig;
use basinlink_core::error::Result;
use basinlink_core::models::Crs;
use basinlink_core::sources;
use basinlink_geo::join::join_contains;

use crate::archive::{extract_zip, OverwritePolicy};
use crate::formats::{read_geojson, read_points_csv, read_shapefile, write_geojson};
use crate::wfs::{DownloadEvent, WfsClient};

/// Default file names for the facilities dataset
pub const FACILITIES_RAW_FILE: &str = "facilities.csv";
pub const FACILITIES_PROCESSED_FILE: &str = "facilities.geojson";

/// Default file names for the watershed groups dataset. The raw name is the
/// shapefile GeoServer packs into its SHAPE-ZIP response for the FWA layer.
pub const WATERSHED_GROUPS_RAW_FILE: &str =
    "WHSE_BASEMAPPING_FWA_WATERSHED_GROUPS_POLYPolygon.shp";
pub const WATERSHED_GROUPS_PROCESSED_FILE: &str = "watershed_groups.geojson";

/// Output name for the derived facilities-to-watersheds dataset
pub const LINKED_PROCESSED_FILE: &str = "facilities_watershed_groups.geojson";

/// Coordinate column names in the facilities CSV
const FACILITIES_X_COLUMN: &str = "longitude";
const FACILITIES_Y_COLUMN: &str = "latitude";

fn overwrite_policy(config: &LayeredConfig) -> OverwritePolicy {
    if config.overwrite.value {
        OverwritePolicy::Overwrite
    } else {
        OverwritePolicy::Skip
    }
}

/// Convert the facilities CSV to processed GeoJSON.
///
/// Bare CSV coordinates carry no CRS of their own, so the configured
/// default CRS is assumed. Returns the path of the processed file.
pub fn ingest_facilities(config: &LayeredConfig) -> Result<PathBuf> {
    let source = sources::facilities(&config.data_dir.value);
    let csv_path = source.raw_dir.join(FACILITIES_RAW_FILE);
    let output_path = source.processed_dir.join(FACILITIES_PROCESSED_FILE);

    let facilities = read_points_csv(
        &csv_path,
        FACILITIES_X_COLUMN,
        FACILITIES_Y_COLUMN,
        Crs::new(config.default_crs.value.clone()),
    )?;
    write_geojson(&facilities, &output_path)?;

    tracing::info!(
        features = facilities.len(),
        output = %output_path.display(),
        "ingested facilities"
    );

    Ok(output_path)
}

/// Download, extract, and convert the watershed groups layer.
///
/// Fetches the SHAPE-ZIP archive from the configured WFS endpoint, unzips
/// it into the raw directory, and converts the shapefile to processed
/// GeoJSON. Download progress is forwarded to `on_progress` so callers
/// can attach a display. Returns the path of the processed file.
pub async fn ingest_watershed_groups(
    config: &LayeredConfig,
    on_progress: impl FnMut(DownloadEvent),
) -> Result<PathBuf> {
    let source = sources::fwa_watershed_groups(&config.data_dir.value);
    let client = WfsClient::new(
        config.wfs_base_url.value.clone(),
        config.wfs_version.value.clone(),
    )?;

    let zip_path = client.download_shapefile(&source, on_progress).await?;
    extract_zip(&zip_path, &source.source.raw_dir, overwrite_policy(config))?;

    convert_watershed_groups(config)
}

/// Convert an already-downloaded watershed groups shapefile to GeoJSON.
///
/// Split out from [`ingest_watershed_groups`] so a previously fetched
/// archive can be reprocessed without touching the network.
pub fn convert_watershed_groups(config: &LayeredConfig) -> Result<PathBuf> {
    let source = sources::fwa_watershed_groups(&config.data_dir.value);
    let shapefile_path = source.source.raw_dir.join(WATERSHED_GROUPS_RAW_FILE);
    let output_path = source
        .source
        .processed_dir
        .join(WATERSHED_GROUPS_PROCESSED_FILE);

    let watersheds = read_shapefile(&shapefile_path)?;
    write_geojson(&watersheds, &output_path)?;

    tracing::info!(
        features = watersheds.len(),
        output = %output_path.display(),
        "ingested watershed groups"
    );

    Ok(output_path)
}

/// Join processed facilities to processed watershed groups.
///
/// Loads both processed datasets, attributes each facility point with the
/// watershed group polygon containing it, and writes the derived GeoJSON.
/// Returns the path of the derived file.
pub fn link_facilities_to_watershed_groups(config: &LayeredConfig) -> Result<PathBuf> {
    let (facilities_source, watersheds_source) = sources::from_config(config);

    let facilities = read_geojson(
        &facilities_source
            .processed_dir
            .join(FACILITIES_PROCESSED_FILE),
    )?;
    let watersheds = read_geojson(
        &watersheds_source
            .source
            .processed_dir
            .join(WATERSHED_GROUPS_PROCESSED_FILE),
    )?;

    let linked = join_contains(&facilities, &watersheds)?;

    let output_path = facilities_source.processed_dir.join(LINKED_PROCESSED_FILE);
    write_geojson(&linked, &output_path)?;

    tracing::info!(
        facilities = facilities.len(),
        watersheds = watersheds.len(),
        output = %output_path.display(),
        "linked facilities to watershed groups"
    );

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinlink_core::config::CliConfigOverrides;
    use std::fs;
    use std::path::Path;

    fn config_for(data_dir: &Path) -> LayeredConfig {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            data_dir: Some(data_dir.to_path_buf()),
            ..CliConfigOverrides::default()
        });
        config
    }

    #[test]
    fn test_ingest_facilities_writes_processed_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let raw_dir = dir.path().join("raw");
        fs::create_dir_all(&raw_dir).unwrap();
        fs::write(
            raw_dir.join(FACILITIES_RAW_FILE),
            "facility_id,name,longitude,latitude\n\
             1,North Plant,-123.1,49.25\n",
        )
        .unwrap();

        let config = config_for(dir.path());
        let output = ingest_facilities(&config).unwrap();

        assert_eq!(
            output,
            dir.path().join("processed").join(FACILITIES_PROCESSED_FILE)
        );
        let processed = read_geojson(&output).unwrap();
        assert_eq!(processed.len(), 1);
        assert_eq!(
            processed.features[0].attribute("name"),
            Some(&serde_json::json!("North Plant"))
        );
    }

    #[test]
    fn test_ingest_facilities_missing_csv_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        assert!(ingest_facilities(&config).is_err());
    }
}
