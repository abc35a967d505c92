//! Error types for basinlink

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BasinlinkError {
    // CRS errors
    #[error("Unknown CRS {crs}: {reason}")]
    UnknownCrs { crs: String, reason: String },

    #[error("No transformation path from {from} to {to}: {reason}")]
    IncompatibleCrs {
        from: String,
        to: String,
        reason: String,
    },

    #[error("CRS reconciliation failed: point layer is {point_crs}, polygon layer is {polygon_crs}")]
    CrsMismatch {
        point_crs: String,
        polygon_crs: String,
        #[source]
        source: Box<BasinlinkError>,
    },

    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    // WFS errors
    #[error("WFS exception {code}: {message}")]
    WfsException { code: String, message: String },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    // Archive errors
    #[error("Archive error for {path}: {message}")]
    Archive { path: PathBuf, message: String },

    // Format errors
    #[error("{format} error: {message}")]
    Format { format: String, message: String },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Invalid record {record} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        record: usize,
        reason: String,
    },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, BasinlinkError>;
