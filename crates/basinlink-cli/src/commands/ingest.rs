//! Ingest command implementation

use anyhow::{Context, Result};
use basinlink_core::config::LayeredConfig;
use basinlink_ingest::pipeline;

use crate::cli::{Dataset, IngestArgs};
use crate::output::OutputWriter;
use crate::progress::DownloadProgress;

pub async fn execute(
    args: IngestArgs,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    match args.dataset {
        Dataset::Facilities => ingest_facilities(config, output),
        Dataset::WatershedGroups => ingest_watershed_groups(config, output, args.offline).await,
        Dataset::All => {
            ingest_facilities(config, output)?;
            ingest_watershed_groups(config, output, args.offline).await
        }
    }
}

fn ingest_facilities(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let path = pipeline::ingest_facilities(config).context("Failed to ingest facilities")?;
    output.success(format!("Facilities written to {}", path.display()));
    Ok(())
}

async fn ingest_watershed_groups(
    config: &LayeredConfig,
    output: &OutputWriter,
    offline: bool,
) -> Result<()> {
    let path = if offline {
        output.info("Offline mode: converting the previously downloaded shapefile");
        pipeline::convert_watershed_groups(config)
            .context("Failed to convert watershed groups")?
    } else {
        let mut progress = DownloadProgress::new("Downloading watershed groups archive...");
        let result =
            pipeline::ingest_watershed_groups(config, |event| progress.handle(event)).await;
        if result.is_err() {
            progress.abandon();
        }
        result.context("Failed to ingest watershed groups")?
    };
    output.success(format!("Watershed groups written to {}", path.display()));
    Ok(())
}
