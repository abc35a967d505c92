//! R-tree envelope index over polygon features.
//!
//! The index is a candidate filter only: it answers "which polygon
//! envelopes cover this point" and the join applies the exact containment
//! predicate afterwards. Behaviour is therefore identical to a full scan.

use geo::algorithm::bounding_rect::BoundingRect;
use rstar::{RTree, RTreeObject, AABB};

/// Envelope entry pointing back at a polygon's input position
#[derive(Debug, Clone, PartialEq)]
struct IndexedEnvelope {
    /// Position of the polygon in the input collection
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over polygon bounding boxes
pub struct PolygonIndex {
    tree: RTree<IndexedEnvelope>,
}

impl PolygonIndex {
    /// Build the index from the polygons' computational geometries.
    ///
    /// Entries are keyed by input position. Geometries without a bounding
    /// rectangle (empty ring sets) contain nothing and are left out.
    pub fn build(polygons: &[geo::MultiPolygon<f64>]) -> Self {
        let entries: Vec<IndexedEnvelope> = polygons
            .iter()
            .enumerate()
            .filter_map(|(idx, mp)| {
                mp.bounding_rect().map(|rect| IndexedEnvelope {
                    idx,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Input positions of all polygons whose envelope covers the point,
    /// in ascending input order.
    ///
    /// Sorting restores determinism: the tree returns candidates in
    /// traversal order, and the join's first-match-wins policy is defined
    /// over the *input* order of the polygon collection.
    pub fn candidates(&self, point: [f64; 2]) -> Vec<usize> {
        let probe = AABB::from_point(point);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&probe)
            .map(|entry| entry.idx)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon::new(vec![geo::Polygon::new(
            geo::LineString::from(vec![
                (min, min),
                (max, min),
                (max, max),
                (min, max),
                (min, min),
            ]),
            vec![],
        )])
    }

    #[test]
    fn test_candidates_filtered_by_envelope() {
        let index = PolygonIndex::build(&[square(0.0, 10.0), square(20.0, 30.0)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.candidates([5.0, 5.0]), vec![0]);
        assert_eq!(index.candidates([25.0, 25.0]), vec![1]);
        assert!(index.candidates([15.0, 15.0]).is_empty());
    }

    #[test]
    fn test_candidates_in_input_order() {
        // Three overlapping squares: every probe inside all of them must
        // report positions in ascending input order
        let index = PolygonIndex::build(&[square(0.0, 10.0), square(-5.0, 15.0), square(2.0, 8.0)]);

        assert_eq!(index.candidates([5.0, 5.0]), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_geometry_skipped() {
        let empty = geo::MultiPolygon::<f64>::new(vec![]);
        let index = PolygonIndex::build(&[empty, square(0.0, 10.0)]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.candidates([5.0, 5.0]), vec![1]);
    }

    #[test]
    fn test_empty_index() {
        let index = PolygonIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.candidates([0.0, 0.0]).is_empty());
    }
}
