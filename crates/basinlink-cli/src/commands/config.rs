//! Config command implementation

use anyhow::Result;
use basinlink_core::config::{ConfigSource, LayeredConfig};

use crate::output::OutputWriter;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    output.info("Effective configuration:");

    let mut entries: Vec<_> = config.to_inspection_map().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, (value, source)) in entries {
        output.key_value(key, value, format!("({})", source_label(source)));
    }

    Ok(())
}

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "config file",
        ConfigSource::Environment => "environment",
        ConfigSource::Cli => "command line",
    }
}
