//! Link command implementation

use anyhow::{Context, Result};
use basinlink_core::config::LayeredConfig;
use basinlink_ingest::pipeline;

use crate::output::OutputWriter;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let path = pipeline::link_facilities_to_watershed_groups(config)
        .context("Failed to link facilities to watershed groups")?;
    output.success(format!("Linked dataset written to {}", path.display()));
    Ok(())
}
