//! Coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system identified by an `authority:code` token.
///
/// The token is opaque: two CRS are compatible iff their tokens compare
/// equal as strings. No semantic aliasing is attempted, so `"EPSG:4326"`
/// and `"urn:ogc:def:crs:EPSG::4326"` are distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(String);

impl Crs {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// CRS for an EPSG authority code
    pub fn epsg(code: u32) -> Self {
        Self(format!("EPSG:{}", code))
    }

    /// WGS 84 (EPSG:4326), the GeoJSON and bare-coordinate default
    pub fn wgs84() -> Self {
        Self::epsg(4326)
    }

    /// BC Albers (EPSG:3005), the native CRS of the BC watershed layers
    pub fn bc_albers() -> Self {
        Self::epsg(3005)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_token() {
        assert_eq!(Crs::epsg(3005).as_str(), "EPSG:3005");
        assert_eq!(Crs::wgs84(), Crs::new("EPSG:4326"));
    }

    #[test]
    fn test_structural_equality() {
        // Equality is on the token, not on CRS semantics
        assert_ne!(Crs::wgs84(), Crs::new("urn:ogc:def:crs:EPSG::4326"));
        assert_eq!(Crs::new("EPSG:4326"), Crs::epsg(4326));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Crs::bc_albers()).unwrap();
        assert_eq!(json, "\"EPSG:3005\"");
        let parsed: Crs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Crs::bc_albers());
    }
}
