//! Features and feature collections.

use serde::{Deserialize, Serialize};

use crate::models::{Crs, Geometry};

/// Ordered attribute mapping of field name to tagged scalar value.
///
/// `serde_json::Map` is built with the `preserve_order` feature, so output
/// field ordering is deterministic and follows insertion order.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A single record: one geometry plus its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(geometry: Geometry, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }
}

/// An ordered sequence of features sharing one CRS.
///
/// The CRS identifier may be unset when the source carries none; loaders
/// that can supply a documented default (bare CSV coordinates) do so
/// explicitly. Collections are never mutated in place by the core
/// operations, which produce fresh collections instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub crs: Option<Crs>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create an empty collection with the given CRS
    pub fn new(crs: Option<Crs>) -> Self {
        Self {
            crs,
            features: Vec::new(),
        }
    }

    /// Create a collection from parts
    pub fn with_features(crs: Option<Crs>, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate over the features in input order
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, serde_json::Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_attribute_lookup() {
        let feature = Feature::new(
            Geometry::point(-123.0, 49.0),
            attrs(&[("id", serde_json::json!(1)), ("name", serde_json::json!("plant"))]),
        );

        assert_eq!(feature.attribute("id"), Some(&serde_json::json!(1)));
        assert_eq!(feature.attribute("missing"), None);
    }

    #[test]
    fn test_attribute_order_preserved() {
        let mut attributes = Attributes::new();
        attributes.insert("zulu".to_string(), serde_json::json!(1));
        attributes.insert("alpha".to_string(), serde_json::json!(2));
        attributes.insert("mike".to_string(), serde_json::json!(3));

        let keys: Vec<&str> = attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_collection_push_and_len() {
        let mut collection = FeatureCollection::new(Some(Crs::wgs84()));
        assert!(collection.is_empty());

        collection.push(Feature::new(Geometry::point(0.0, 0.0), Attributes::new()));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.crs, Some(Crs::wgs84()));
    }
}
