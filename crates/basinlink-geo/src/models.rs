//! Conversions between canonical geometries and `geo` crate types.
//!
//! The canonical `Geometry` from `basinlink-core` is a coordinate-array
//! representation; predicate evaluation and envelope computation need the
//! computational types from the `geo` crate.

use geo::Geometry as GeoGeometry;

pub use basinlink_core::models::{Attributes, Crs, Feature, FeatureCollection, Geometry};

fn ring_to_line_string(ring: &[[f64; 2]]) -> geo::LineString<f64> {
    geo::LineString::new(ring.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

fn rings_to_polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon<f64> {
    if rings.is_empty() {
        return geo::Polygon::new(geo::LineString::new(vec![]), vec![]);
    }
    let exterior = ring_to_line_string(&rings[0]);
    let interiors = rings[1..].iter().map(|r| ring_to_line_string(r)).collect();
    geo::Polygon::new(exterior, interiors)
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry<f64> {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(rings_to_polygon(coordinates)),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(geo::MultiPolygon::new(
            coordinates.iter().map(|p| rings_to_polygon(p)).collect(),
        )),
    }
}

/// Convert an areal canonical Geometry to a geo::MultiPolygon.
///
/// Returns None for non-areal geometries. Single polygons become a
/// one-member multi-polygon so the join evaluates one predicate type.
pub fn to_geo_multi_polygon(geom: &Geometry) -> Option<geo::MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon { coordinates } => {
            Some(geo::MultiPolygon::new(vec![rings_to_polygon(coordinates)]))
        }
        Geometry::MultiPolygon { coordinates } => Some(geo::MultiPolygon::new(
            coordinates.iter().map(|p| rings_to_polygon(p)).collect(),
        )),
        Geometry::Point { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion() {
        let geom = Geometry::point(-123.0, 49.0);
        match to_geo_geometry(&geom) {
            GeoGeometry::Point(p) => {
                assert!((p.x() + 123.0).abs() < 1e-10);
                assert!((p.y() - 49.0).abs() < 1e-10);
            }
            other => panic!("Expected Point, got {:?}", other),
        }
    }

    #[test]
    fn test_polygon_rings() {
        let geom = Geometry::polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0], [1.0, 1.0]],
        ]);

        let mp = to_geo_multi_polygon(&geom).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_multi_polygon_conversion() {
        let geom = Geometry::multi_polygon(vec![
            vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            vec![vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]],
        ]);

        let mp = to_geo_multi_polygon(&geom).unwrap();
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn test_point_is_not_areal() {
        assert!(to_geo_multi_polygon(&Geometry::point(0.0, 0.0)).is_none());
    }
}
