//! GeoJSON reader and writer.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::models::{Attributes, Crs, Feature, FeatureCollection, Geometry};
use basinlink_geo::transform::normalize_to;

fn format_error(message: String) -> BasinlinkError {
    BasinlinkError::Format {
        format: "GeoJSON".to_string(),
        message,
    }
}

/// Read a GeoJSON file into a feature collection.
///
/// A `crs` foreign member is honoured when present; otherwise the
/// collection defaults to WGS 84 per the GeoJSON convention.
pub fn read_geojson(path: &Path) -> Result<FeatureCollection> {
    let content = fs::read_to_string(path)?;

    let geojson: geojson::GeoJson = content
        .parse()
        .map_err(|e| format_error(format!("Failed to parse {}: {}", path.display(), e)))?;

    match geojson {
        geojson::GeoJson::FeatureCollection(fc) => {
            let crs = fc
                .foreign_members
                .as_ref()
                .and_then(|fm| fm.get("crs"))
                .and_then(crs_from_foreign_member)
                .unwrap_or_else(Crs::wgs84);

            let features = fc
                .features
                .iter()
                .enumerate()
                .map(|(idx, feature)| convert_feature(feature, idx))
                .collect::<Result<Vec<_>>>()?;

            Ok(FeatureCollection::with_features(Some(crs), features))
        }
        geojson::GeoJson::Feature(feature) => Ok(FeatureCollection::with_features(
            Some(Crs::wgs84()),
            vec![convert_feature(&feature, 0)?],
        )),
        geojson::GeoJson::Geometry(geometry) => Ok(FeatureCollection::with_features(
            Some(Crs::wgs84()),
            vec![Feature::new(
                convert_geometry(&geometry.value, 0)?,
                Attributes::new(),
            )],
        )),
    }
}

/// Serialize a collection to a GeoJSON file.
///
/// GeoJSON coordinates are WGS 84 by convention, so a collection carrying
/// another CRS is reprojected first. A collection without a CRS is written
/// as-is. Parent directories are created if absent.
pub fn write_geojson(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let wgs84 = Crs::wgs84();
    let reprojected;
    let collection = match &collection.crs {
        Some(crs) if *crs != wgs84 => {
            reprojected = normalize_to(&wgs84, collection)?;
            &reprojected
        }
        _ => collection,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let features = collection
        .iter()
        .map(|f| geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geometry_to_value(&f.geometry))),
            id: None,
            properties: Some(f.attributes.clone()),
            foreign_members: None,
        })
        .collect();

    let fc = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let file = fs::File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &geojson::GeoJson::FeatureCollection(fc))
        .map_err(|e| BasinlinkError::Serialization(e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        features = collection.len(),
        "wrote GeoJSON"
    );

    Ok(())
}

fn convert_feature(feature: &geojson::Feature, idx: usize) -> Result<Feature> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| format_error(format!("feature {} has no geometry", idx)))?;

    let attributes = feature.properties.clone().unwrap_or_default();

    Ok(Feature::new(
        convert_geometry(&geometry.value, idx)?,
        attributes,
    ))
}

fn convert_geometry(value: &geojson::Value, idx: usize) -> Result<Geometry> {
    match value {
        geojson::Value::Point(position) => Ok(Geometry::Point {
            coordinates: convert_position(position, idx)?,
        }),
        geojson::Value::Polygon(rings) => Ok(Geometry::Polygon {
            coordinates: convert_rings(rings, idx)?,
        }),
        geojson::Value::MultiPolygon(polygons) => Ok(Geometry::MultiPolygon {
            coordinates: polygons
                .iter()
                .map(|rings| convert_rings(rings, idx))
                .collect::<Result<_>>()?,
        }),
        other => Err(format_error(format!(
            "feature {} has unsupported geometry type {}",
            idx,
            other.type_name()
        ))),
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>], idx: usize) -> Result<Vec<Vec<[f64; 2]>>> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|position| convert_position(position, idx))
                .collect()
        })
        .collect()
}

fn convert_position(position: &[f64], idx: usize) -> Result<[f64; 2]> {
    if position.len() < 2 {
        return Err(format_error(format!(
            "feature {} has a position with fewer than two ordinates",
            idx
        )));
    }
    // Altitude and measure ordinates are dropped
    Ok([position[0], position[1]])
}

fn geometry_to_value(geometry: &Geometry) -> geojson::Value {
    match geometry {
        Geometry::Point { coordinates } => {
            geojson::Value::Point(vec![coordinates[0], coordinates[1]])
        }
        Geometry::Polygon { coordinates } => geojson::Value::Polygon(rings_to_positions(coordinates)),
        Geometry::MultiPolygon { coordinates } => geojson::Value::MultiPolygon(
            coordinates.iter().map(|p| rings_to_positions(p)).collect(),
        ),
    }
}

fn rings_to_positions(rings: &[Vec<[f64; 2]>]) -> Vec<Vec<Vec<f64>>> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|c| vec![c[0], c[1]]).collect())
        .collect()
}

/// Extract a CRS token from a GeoJSON `crs` foreign member.
///
/// Handles both `"EPSG:4326"` and `"urn:ogc:def:crs:EPSG::4326"` name
/// forms by taking the trailing numeric code.
fn crs_from_foreign_member(crs: &serde_json::Value) -> Option<Crs> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    let code = name.rsplit(':').next()?.parse::<u32>().ok()?;
    Some(Crs::epsg(code))
}
