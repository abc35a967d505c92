//! CSV-with-coordinate-columns reader.

use std::path::Path;

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::models::{Attributes, Crs, Feature, FeatureCollection, Geometry};

/// Load a CSV file with coordinate columns into a point collection.
///
/// The coordinate column names and the CRS of the bare coordinates are
/// explicit parameters; there is no implicit default. Every column,
/// including the coordinate ones, is kept as an attribute in header order.
pub fn read_points_csv(
    path: &Path,
    x_column: &str,
    y_column: &str,
    crs: Crs,
) -> Result<FeatureCollection> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BasinlinkError::Format {
        format: "CSV".to_string(),
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| BasinlinkError::Format {
            format: "CSV".to_string(),
            message: format!("Failed to read headers: {}", e),
        })?
        .clone();

    let x_idx = headers
        .iter()
        .position(|h| h == x_column)
        .ok_or_else(|| BasinlinkError::MissingColumn {
            column: x_column.to_string(),
            path: path.to_path_buf(),
        })?;
    let y_idx = headers
        .iter()
        .position(|h| h == y_column)
        .ok_or_else(|| BasinlinkError::MissingColumn {
            column: y_column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut collection = FeatureCollection::new(Some(crs));

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| BasinlinkError::InvalidRecord {
            path: path.to_path_buf(),
            record: row + 1,
            reason: e.to_string(),
        })?;

        let x = parse_coordinate(&record, x_idx, x_column, path, row + 1)?;
        let y = parse_coordinate(&record, y_idx, y_column, path, row + 1)?;

        let mut attributes = Attributes::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            attributes.insert(header.to_string(), parse_scalar(value));
        }

        collection.push(Feature::new(Geometry::point(x, y), attributes));
    }

    tracing::debug!(
        path = %path.display(),
        features = collection.len(),
        "loaded CSV points"
    );

    Ok(collection)
}

fn parse_coordinate(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    path: &Path,
    row: usize,
) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    raw.trim()
        .parse::<f64>()
        .map_err(|_| BasinlinkError::InvalidRecord {
            path: path.to_path_buf(),
            record: row,
            reason: format!("column '{}' has non-numeric value '{}'", column, raw),
        })
}

/// Map a raw CSV field to a tagged scalar: integer, float, or string,
/// with empty fields becoming null.
fn parse_scalar(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return serde_json::Value::from(n);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(n) {
            return serde_json::Value::Number(number);
        }
    }
    serde_json::Value::String(trimmed.to_string())
}
