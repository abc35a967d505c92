//! Point-in-polygon attribution join.
//!
//! Each point record is attributed with the polygon containing it. The
//! polygon layer is conformed to the point layer's CRS first, so the point
//! layer is always authoritative. Containment follows the `geo` crate's
//! `Contains` semantics: a point on a polygon boundary is NOT contained.
//!
//! When a point falls inside several overlapping polygons (a data-quality
//! condition), the first polygon in input order wins. This is a stable,
//! documented policy, not a geometric judgement.

use std::collections::HashSet;

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::models::{Crs, Feature, FeatureCollection, Geometry};
use geo::algorithm::contains::Contains;

use crate::index::PolygonIndex;
use crate::models::to_geo_multi_polygon;
use crate::transform::{crs_match, normalize_to};

/// Suffix applied to polygon attribute names that collide with point names
const COLLISION_SUFFIX: &str = "_right";

fn crs_label(crs: Option<&Crs>) -> String {
    crs.map(|c| c.to_string())
        .unwrap_or_else(|| "unset".to_string())
}

/// Conform the polygon layer to the point layer's CRS.
fn reconcile(
    points: &FeatureCollection,
    polygons: &FeatureCollection,
) -> Result<FeatureCollection> {
    let point_label = crs_label(points.crs.as_ref());
    let polygon_label = crs_label(polygons.crs.as_ref());

    let reference = points
        .crs
        .as_ref()
        .ok_or_else(|| BasinlinkError::CrsMismatch {
            point_crs: point_label.clone(),
            polygon_crs: polygon_label.clone(),
            source: Box::new(BasinlinkError::UnknownCrs {
                crs: "unset".to_string(),
                reason: "point layer carries no CRS identifier".to_string(),
            }),
        })?;

    normalize_to(reference, polygons).map_err(|e| BasinlinkError::CrsMismatch {
        point_crs: point_label,
        polygon_crs: polygon_label,
        source: Box::new(e),
    })
}

/// Polygon-side output schema: attribute names in first-seen order across
/// the polygon features, renamed where they collide with a point name.
fn polygon_schema(
    points: &FeatureCollection,
    polygons: &FeatureCollection,
) -> Vec<(String, String)> {
    let point_names: HashSet<&str> = points
        .iter()
        .flat_map(|f| f.attributes.keys())
        .map(String::as_str)
        .collect();

    let mut seen = HashSet::new();
    let mut schema = Vec::new();
    for feature in polygons.iter() {
        for name in feature.attributes.keys() {
            if seen.insert(name.clone()) {
                let output = if point_names.contains(name.as_str()) {
                    format!("{}{}", name, COLLISION_SUFFIX)
                } else {
                    name.clone()
                };
                schema.push((name.clone(), output));
            }
        }
    }
    schema
}

/// Join each point to the polygon containing it.
///
/// Returns one record per input point, in input order, carrying the point's
/// attributes plus the matched polygon's attributes (null-filled when no
/// polygon contains the point). Points are never dropped; an empty polygon
/// collection is valid and yields every point unmatched. The whole join
/// either completes or fails before any output is produced.
pub fn join_contains(
    points: &FeatureCollection,
    polygons: &FeatureCollection,
) -> Result<FeatureCollection> {
    // An empty polygon layer has nothing to reproject and nothing to
    // match; skip reconciliation so a missing CRS on it is not an error.
    let reconciled;
    let polygons = if polygons.is_empty() || crs_match(points.crs.as_ref(), polygons.crs.as_ref())
    {
        polygons
    } else {
        reconciled = reconcile(points, polygons)?;
        &reconciled
    };

    // Convert polygon geometries once and reject anything non-areal
    let mut geo_polys = Vec::with_capacity(polygons.len());
    for (i, feature) in polygons.iter().enumerate() {
        let mp = to_geo_multi_polygon(&feature.geometry).ok_or_else(|| {
            BasinlinkError::InvalidGeometry {
                feature_id: i.to_string(),
                reason: format!(
                    "polygon layer contains a {:?} geometry",
                    feature.geometry.geometry_type()
                ),
            }
        })?;
        geo_polys.push(mp);
    }

    let index = PolygonIndex::build(&geo_polys);
    let schema = polygon_schema(points, polygons);

    tracing::debug!(
        points = points.len(),
        polygons = polygons.len(),
        "joining points to containing polygons"
    );

    let mut features = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let Geometry::Point { coordinates } = &point.geometry else {
            return Err(BasinlinkError::InvalidGeometry {
                feature_id: i.to_string(),
                reason: format!(
                    "point layer contains a {:?} geometry",
                    point.geometry.geometry_type()
                ),
            });
        };

        let probe = geo::Point::new(coordinates[0], coordinates[1]);

        // Candidates arrive in ascending input order, so the first exact
        // hit is the first-match-wins winner.
        let matched = index
            .candidates(*coordinates)
            .into_iter()
            .find(|&idx| geo_polys[idx].contains(&probe));

        let mut attributes = point.attributes.clone();
        for (source_name, output_name) in &schema {
            let value = matched
                .and_then(|idx| polygons.features[idx].attribute(source_name))
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            attributes.insert(output_name.clone(), value);
        }

        features.push(Feature::new(point.geometry.clone(), attributes));
    }

    Ok(FeatureCollection::with_features(
        points.crs.clone(),
        features,
    ))
}
