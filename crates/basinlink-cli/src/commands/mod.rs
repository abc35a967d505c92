//! Command implementations

mod config;
mod ingest;
mod link;

use anyhow::{Context, Result};
use basinlink_core::config::{CliConfigOverrides, LayeredConfig};

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Ingest(args) => ingest::execute(args, &config, &output).await,
        Commands::Link => link::execute(&config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}

/// Build the effective configuration from defaults, file, environment,
/// and CLI overrides, in ascending precedence.
fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }

    config = config.load_from_env();

    config.update_from_cli(CliConfigOverrides {
        data_dir: cli.data_dir.clone(),
        default_crs: cli.default_crs.clone(),
        wfs_base_url: cli.wfs_base_url.clone(),
        overwrite: cli.overwrite,
    });

    Ok(config)
}
