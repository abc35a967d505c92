//! CRS normalization via PROJ pipelines.
//!
//! The point layer is always authoritative: other collections are conformed
//! to its CRS before any geometric comparison. Identifier comparison is
//! structural (string equality), so no reprojection cost is paid when the
//! tokens already match.

use basinlink_core::error::{BasinlinkError, Result};
use basinlink_core::models::{Crs, Feature, FeatureCollection, Geometry};
use proj::Proj;

/// Check whether two CRS identifiers are compatible.
///
/// Two unset identifiers compare equal; an unset identifier never matches
/// a concrete one.
pub fn crs_match(a: Option<&Crs>, b: Option<&Crs>) -> bool {
    a == b
}

/// Verify that a CRS token resolves to a known definition.
///
/// An identity pipeline is the cheapest way to ask PROJ whether it knows
/// the token at all, and lets errors name the offending CRS rather than
/// the pair.
fn resolve(crs: &Crs) -> Result<()> {
    Proj::new_known_crs(crs.as_str(), crs.as_str(), None)
        .map(|_| ())
        .map_err(|e| BasinlinkError::UnknownCrs {
            crs: crs.to_string(),
            reason: e.to_string(),
        })
}

fn pipeline(from: &Crs, to: &Crs) -> Result<Proj> {
    // Both tokens resolved individually first, so a failure here means the
    // pair has no transformation path, not that a token is unknown.
    resolve(from)?;
    resolve(to)?;

    Proj::new_known_crs(from.as_str(), to.as_str(), None).map_err(|e| {
        BasinlinkError::IncompatibleCrs {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        }
    })
}

fn convert_coord(proj: &Proj, from: &Crs, to: &Crs, coord: [f64; 2]) -> Result<[f64; 2]> {
    proj.convert((coord[0], coord[1]))
        .map(|(x, y)| [x, y])
        .map_err(|e| BasinlinkError::IncompatibleCrs {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        })
}

fn convert_ring(proj: &Proj, from: &Crs, to: &Crs, ring: &[[f64; 2]]) -> Result<Vec<[f64; 2]>> {
    ring.iter()
        .map(|c| convert_coord(proj, from, to, *c))
        .collect()
}

/// Reproject a single geometry through an established pipeline
fn reproject_geometry(proj: &Proj, from: &Crs, to: &Crs, geometry: &Geometry) -> Result<Geometry> {
    match geometry {
        Geometry::Point { coordinates } => Ok(Geometry::Point {
            coordinates: convert_coord(proj, from, to, *coordinates)?,
        }),
        Geometry::Polygon { coordinates } => Ok(Geometry::Polygon {
            coordinates: coordinates
                .iter()
                .map(|ring| convert_ring(proj, from, to, ring))
                .collect::<Result<_>>()?,
        }),
        Geometry::MultiPolygon { coordinates } => Ok(Geometry::MultiPolygon {
            coordinates: coordinates
                .iter()
                .map(|poly| {
                    poly.iter()
                        .map(|ring| convert_ring(proj, from, to, ring))
                        .collect::<Result<_>>()
                })
                .collect::<Result<_>>()?,
        }),
    }
}

/// Conform a collection to a reference CRS.
///
/// Returns the input unchanged (a structural copy) when the identifiers
/// already match. Otherwise every geometry is transformed through a PROJ
/// pipeline and the returned collection carries the reference identifier.
/// The input is never mutated.
pub fn normalize_to(reference: &Crs, target: &FeatureCollection) -> Result<FeatureCollection> {
    let current = target.crs.as_ref().ok_or_else(|| BasinlinkError::UnknownCrs {
        crs: "unset".to_string(),
        reason: "collection carries no CRS identifier".to_string(),
    })?;

    if current == reference {
        return Ok(target.clone());
    }

    let proj = pipeline(current, reference)?;

    tracing::debug!(
        from = %current,
        to = %reference,
        features = target.len(),
        "reprojecting collection"
    );

    let features = target
        .iter()
        .map(|f| {
            Ok(Feature::new(
                reproject_geometry(&proj, current, reference, &f.geometry)?,
                f.attributes.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection::with_features(
        Some(reference.clone()),
        features,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinlink_core::models::Attributes;

    fn point_collection(crs: Option<Crs>, x: f64, y: f64) -> FeatureCollection {
        FeatureCollection::with_features(
            crs,
            vec![Feature::new(Geometry::point(x, y), Attributes::new())],
        )
    }

    #[test]
    fn test_crs_match_structural() {
        assert!(crs_match(Some(&Crs::wgs84()), Some(&Crs::epsg(4326))));
        assert!(!crs_match(Some(&Crs::wgs84()), Some(&Crs::bc_albers())));
        assert!(crs_match(None, None));
        assert!(!crs_match(None, Some(&Crs::wgs84())));
    }

    #[test]
    fn test_normalize_noop_on_matching_crs() {
        let collection = point_collection(Some(Crs::wgs84()), -123.0, 49.0);
        let normalized = normalize_to(&Crs::wgs84(), &collection).unwrap();
        // Structural equality: no reprojection took place
        assert_eq!(normalized, collection);
    }

    #[test]
    fn test_normalize_unset_crs_is_unknown() {
        let collection = point_collection(None, -123.0, 49.0);
        let err = normalize_to(&Crs::wgs84(), &collection).unwrap_err();
        assert!(matches!(err, BasinlinkError::UnknownCrs { .. }));
    }

    #[test]
    fn test_normalize_unresolvable_token_is_unknown() {
        let collection = point_collection(Some(Crs::new("EPSG:999999")), -123.0, 49.0);
        let err = normalize_to(&Crs::wgs84(), &collection).unwrap_err();
        match err {
            BasinlinkError::UnknownCrs { crs, .. } => assert_eq!(crs, "EPSG:999999"),
            other => panic!("Expected UnknownCrs, got {:?}", other),
        }
    }

    #[test]
    fn test_reprojection_round_trip() {
        let original = point_collection(Some(Crs::wgs84()), -123.0, 49.0);

        let albers = normalize_to(&Crs::bc_albers(), &original).unwrap();
        assert_eq!(albers.crs, Some(Crs::bc_albers()));

        // Southern BC lands well inside the BC Albers metric range
        let Geometry::Point { coordinates } = albers.features[0].geometry else {
            panic!("Expected a point");
        };
        assert!(coordinates[0] > 2.0e5 && coordinates[0] < 1.9e6);
        assert!(coordinates[1] > 1.0e5 && coordinates[1] < 1.8e6);

        let back = normalize_to(&Crs::wgs84(), &albers).unwrap();
        let Geometry::Point { coordinates } = back.features[0].geometry else {
            panic!("Expected a point");
        };
        assert!((coordinates[0] + 123.0).abs() < 1e-6);
        assert!((coordinates[1] - 49.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let original = point_collection(Some(Crs::wgs84()), -123.0, 49.0);

        let once = normalize_to(&Crs::bc_albers(), &original).unwrap();
        // A second normalization against the same reference is a no-op
        let twice = normalize_to(&Crs::bc_albers(), &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_preserves_attributes() {
        let mut attributes = Attributes::new();
        attributes.insert("id".to_string(), serde_json::json!(7));
        let collection = FeatureCollection::with_features(
            Some(Crs::wgs84()),
            vec![Feature::new(Geometry::point(-123.0, 49.0), attributes)],
        );

        let normalized = normalize_to(&Crs::bc_albers(), &collection).unwrap();
        assert_eq!(
            normalized.features[0].attribute("id"),
            Some(&serde_json::json!(7))
        );
        // Input untouched
        assert_eq!(collection.crs, Some(Crs::wgs84()));
    }
}
