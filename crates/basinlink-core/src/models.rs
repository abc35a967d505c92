pub mod crs;
pub mod feature;
pub mod geometry;

pub use crs::Crs;
pub use feature::{Attributes, Feature, FeatureCollection};
pub use geometry::{Geometry, GeometryType};
