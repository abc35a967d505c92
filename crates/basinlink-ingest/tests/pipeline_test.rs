//! Offline end-to-end run of the ingestion workflows.
//!
//! Stages raw inputs on disk (a facilities CSV and a pre-downloaded
//! watershed shapefile), runs the conversion and linking workflows, and
//! checks the derived dataset. The WFS download step is exercised
//! separately; everything here stays on the local filesystem.

use std::fs;
use std::path::Path;

use basinlink_core::config::{CliConfigOverrides, LayeredConfig};
use basinlink_ingest::formats::read_geojson;
use basinlink_ingest::pipeline::{
    convert_watershed_groups, ingest_facilities, link_facilities_to_watershed_groups,
    WATERSHED_GROUPS_RAW_FILE,
};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, PolygonRing};

const BC_ALBERS_WKT: &str = r#"PROJCS["NAD83 / BC Albers",GEOGCS["NAD83",DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101]]],PROJECTION["Albers_Conic_Equal_Area"],AUTHORITY["EPSG","3005"]]"#;

fn config_for(data_dir: &Path) -> LayeredConfig {
    let mut config = LayeredConfig::with_defaults();
    config.update_from_cli(CliConfigOverrides {
        data_dir: Some(data_dir.to_path_buf()),
        ..CliConfigOverrides::default()
    });
    config
}

fn stage_facilities_csv(data_dir: &Path) {
    let raw_dir = data_dir.join("raw");
    fs::create_dir_all(&raw_dir).unwrap();
    fs::write(
        raw_dir.join("facilities.csv"),
        "facility_id,name,longitude,latitude\n\
         1,North Plant,-123.1,49.25\n\
         2,Remote Station,-135.0,60.5\n",
    )
    .unwrap();
}

/// Write a watershed shapefile into the raw directory, standing in for an
/// extracted WFS archive. One BC Albers square covering the Vancouver area.
fn stage_watershed_shapefile(data_dir: &Path) {
    let raw_dir = data_dir.join("raw").join("watershed_groups");
    fs::create_dir_all(&raw_dir).unwrap();

    let shp_path = raw_dir.join(WATERSHED_GROUPS_RAW_FILE);
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("WSG_NAME").unwrap(), 50);
    let mut writer = shapefile::Writer::from_path(&shp_path, table).unwrap();

    let ring = PolygonRing::Outer(vec![
        Point::new(900_000.0, 200_000.0),
        Point::new(1_500_000.0, 200_000.0),
        Point::new(1_500_000.0, 800_000.0),
        Point::new(900_000.0, 800_000.0),
        Point::new(900_000.0, 200_000.0),
    ]);
    let mut record = Record::default();
    record.insert(
        "WSG_NAME".to_string(),
        FieldValue::Character(Some("LFRA".to_string())),
    );
    writer
        .write_shape_and_record(&shapefile::Polygon::new(ring), &record)
        .unwrap();
    drop(writer);

    fs::write(shp_path.with_extension("prj"), BC_ALBERS_WKT).unwrap();
}

#[test]
fn offline_ingest_and_link_flow() {
    let dir = tempfile::tempdir().unwrap();
    stage_facilities_csv(dir.path());
    stage_watershed_shapefile(dir.path());

    let config = config_for(dir.path());

    let facilities_path = ingest_facilities(&config).unwrap();
    let watersheds_path = convert_watershed_groups(&config).unwrap();
    let linked_path = link_facilities_to_watershed_groups(&config).unwrap();

    assert!(facilities_path.exists());
    assert!(watersheds_path.exists());

    // Processed watersheds land in WGS 84 regardless of the raw CRS
    let watersheds = read_geojson(&watersheds_path).unwrap();
    assert_eq!(watersheds.len(), 1);

    let linked = read_geojson(&linked_path).unwrap();
    assert_eq!(linked.len(), 2);

    // The Vancouver-area facility falls inside the staged watershed
    let inside = &linked.features[0];
    assert_eq!(inside.attribute("name"), Some(&serde_json::json!("North Plant")));
    assert_eq!(inside.attribute("WSG_NAME"), Some(&serde_json::json!("LFRA")));

    // The Yukon facility matches nothing and keeps a null watershed column
    let outside = &linked.features[1];
    assert_eq!(
        outside.attribute("WSG_NAME"),
        Some(&serde_json::Value::Null)
    );
}

#[test]
fn link_fails_cleanly_when_processed_inputs_are_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    assert!(link_facilities_to_watershed_groups(&config).is_err());
}
