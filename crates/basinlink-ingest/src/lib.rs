//! Basinlink Ingest - Retrieval, extraction, and format conversion
//!
//! Everything between the outside world and an in-memory feature
//! collection: the WFS client, ZIP extraction, the CSV/shapefile/GeoJSON
//! readers, the GeoJSON writer, and the per-dataset ingestion workflows.

pub mod archive;
pub mod formats;
pub mod pipeline;
pub mod wfs;
