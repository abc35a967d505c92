//! Basinlink Core - Domain models, configuration, and error taxonomy
//!
//! This crate contains the data model shared by every basinlink crate:
//! feature collections with explicit CRS identifiers, the layered
//! configuration, and the descriptors for named data sources.

pub mod config;
pub mod error;
pub mod models;
pub mod sources;

pub use error::{BasinlinkError, Result};
