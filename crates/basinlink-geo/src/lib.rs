//! Basinlink Geo - CRS normalization and the containment join
//!
//! This crate holds the geometric core of the pipeline: reconciling two
//! collections onto a common CRS and attributing each facility point with
//! the watershed polygon containing it.

pub mod index;
pub mod join;
pub mod models;
pub mod transform;
