//! Format readers and writers.
//!
//! Each reader turns one on-disk format into a `FeatureCollection` with an
//! explicit CRS identifier (or an unset one when the source carries none).
//! The only writer is GeoJSON, the pipeline's processed format.

pub mod csv;
pub mod geojson;
pub mod shapefile;

pub use csv::read_points_csv;
pub use geojson::{read_geojson, write_geojson};
pub use shapefile::read_shapefile;
