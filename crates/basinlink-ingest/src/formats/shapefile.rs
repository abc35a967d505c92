//! ESRI Shapefile reader.
//!
//! A shapefile is a bundle of component files (.shp, .shx, .dbf and
//! optionally .prj) sharing a base name. The reader verifies the required
//! components before opening, recovers the CRS from the .prj sidecar when
//! one is present, and regroups polygon rings into polygons: each outer
//! ring starts a new polygon and inner rings attach to the preceding outer.

use std::fs;
use std::path::{Path, PathBuf};

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::models::{Attributes, Crs, Feature, FeatureCollection, Geometry};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};

fn format_error(message: String) -> BasinlinkError {
    BasinlinkError::Format {
        format: "Shapefile".to_string(),
        message,
    }
}

/// Read a shapefile into a feature collection.
///
/// The collection's CRS is taken from the .prj sidecar; without one (or
/// with one naming no EPSG code) the CRS is left unset so that downstream
/// operations must reconcile it explicitly rather than guess.
pub fn read_shapefile(path: &Path) -> Result<FeatureCollection> {
    verify_components(path)?;

    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| format_error(format!("Failed to open {}: {}", path.display(), e)))?;

    let crs = read_prj_crs(path)?;
    let mut collection = FeatureCollection::new(crs);

    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .map_err(|e| format_error(format!("Failed to read feature {}: {}", idx, e)))?;

        let geometry = convert_shape(shape, idx)?;
        let attributes = convert_record(record);
        collection.push(Feature::new(geometry, attributes));
    }

    tracing::debug!(
        path = %path.display(),
        features = collection.len(),
        "loaded shapefile"
    );

    Ok(collection)
}

fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);
    if !is_shp {
        return Err(format_error(format!(
            "{} is not a shapefile (.shp)",
            path.display()
        )));
    }
    Ok(path.with_extension(""))
}

fn verify_components(path: &Path) -> Result<()> {
    let base = shapefile_base(path)?;
    let missing: Vec<String> = ["shp", "shx", "dbf"]
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(format_error(format!(
            "{} is missing required component files: {}",
            path.display(),
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Recover the CRS from the .prj sidecar, if any.
///
/// Recognizes the `AUTHORITY["EPSG","code"]` WKT clause and the bare
/// `EPSG:code` form. Anything else leaves the CRS unset.
fn read_prj_crs(path: &Path) -> Result<Option<Crs>> {
    let prj_path = shapefile_base(path)?.with_extension("prj");
    if !prj_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&prj_path)?;
    Ok(parse_epsg_from_wkt(&content).map(Crs::epsg))
}

fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    if let Some(start) = wkt.rfind("AUTHORITY[\"EPSG\",\"") {
        let code_start = start + "AUTHORITY[\"EPSG\",\"".len();
        if let Some(end) = wkt[code_start..].find('"') {
            if let Ok(code) = wkt[code_start..code_start + end].parse::<u32>() {
                return Some(code);
            }
        }
    }

    if let Some(start) = wkt.find("EPSG:") {
        let digits: String = wkt[start + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse::<u32>() {
            return Some(code);
        }
    }

    None
}

fn convert_shape(shape: Shape, idx: usize) -> Result<Geometry> {
    match shape {
        Shape::Point(p) => Ok(Geometry::point(p.x, p.y)),
        // Altitude and measure ordinates are dropped
        Shape::PointZ(p) => Ok(Geometry::point(p.x, p.y)),
        Shape::PointM(p) => Ok(Geometry::point(p.x, p.y)),
        Shape::Polygon(p) => group_rings(p.into_inner(), |p| [p.x, p.y], idx),
        Shape::PolygonZ(p) => group_rings(p.into_inner(), |p| [p.x, p.y], idx),
        Shape::PolygonM(p) => group_rings(p.into_inner(), |p| [p.x, p.y], idx),
        other => Err(BasinlinkError::InvalidGeometry {
            feature_id: idx.to_string(),
            reason: format!("unsupported shape type {}", other.shapetype()),
        }),
    }
}

/// Regroup a flat ring list into polygons.
///
/// Shapefiles store every ring of every part in one sequence; each outer
/// ring opens a new polygon and inner rings belong to the last opened one.
fn group_rings<P>(
    rings: Vec<PolygonRing<P>>,
    to_xy: impl Fn(&P) -> [f64; 2],
    idx: usize,
) -> Result<Geometry> {
    let mut polygons: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();

    for ring in &rings {
        let coords: Vec<[f64; 2]> = ring.points().iter().map(&to_xy).collect();
        match ring {
            PolygonRing::Outer(_) => polygons.push(vec![coords]),
            PolygonRing::Inner(_) => match polygons.last_mut() {
                Some(polygon) => polygon.push(coords),
                None => {
                    return Err(BasinlinkError::InvalidGeometry {
                        feature_id: idx.to_string(),
                        reason: "inner ring precedes any outer ring".to_string(),
                    })
                }
            },
        }
    }

    match polygons.len() {
        0 => Err(BasinlinkError::InvalidGeometry {
            feature_id: idx.to_string(),
            reason: "polygon has no rings".to_string(),
        }),
        1 => Ok(Geometry::Polygon {
            coordinates: polygons.remove(0),
        }),
        _ => Ok(Geometry::MultiPolygon {
            coordinates: polygons,
        }),
    }
}

/// Convert a dBase record into attributes.
///
/// dBase records iterate in unspecified order, so fields are sorted by
/// name to keep attribute order stable across runs.
fn convert_record(record: shapefile::dbase::Record) -> Attributes {
    let mut fields: Vec<(String, FieldValue)> = record.into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .map(|(name, value)| (name, convert_field_value(value)))
        .collect()
}

fn convert_field_value(value: FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Character(Some(s)) => serde_json::Value::String(s),
        FieldValue::Character(None) => serde_json::Value::Null,
        FieldValue::Numeric(Some(n)) => float_value(n),
        FieldValue::Numeric(None) => serde_json::Value::Null,
        FieldValue::Logical(Some(b)) => serde_json::Value::Bool(b),
        FieldValue::Logical(None) => serde_json::Value::Null,
        FieldValue::Date(Some(date)) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Date(None) => serde_json::Value::Null,
        FieldValue::Float(Some(f)) => float_value(f as f64),
        FieldValue::Float(None) => serde_json::Value::Null,
        FieldValue::Integer(i) => serde_json::Value::Number(i.into()),
        FieldValue::Currency(c) => float_value(c),
        FieldValue::DateTime(dt) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        FieldValue::Double(d) => float_value(d),
        FieldValue::Memo(s) => serde_json::Value::String(s),
    }
}

fn float_value(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
