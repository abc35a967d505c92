use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// basinlink - watershed attribution pipeline
#[derive(Parser, Debug)]
#[command(name = "basinlink")]
#[command(about = "Ingest facility and watershed data and link them spatially", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for raw and processed data
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// CRS token assumed for sources that carry none (e.g. EPSG:4326)
    #[arg(long, global = true)]
    pub default_crs: Option<String>,

    /// Base URL of the WFS endpoint
    #[arg(long, global = true)]
    pub wfs_base_url: Option<String>,

    /// Whether extraction may overwrite existing files (true or false)
    #[arg(long, global = true)]
    pub overwrite: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a named dataset into its processed form
    Ingest(IngestArgs),

    /// Link processed facilities to processed watershed groups
    Link,

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Dataset to ingest
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Reuse an already-downloaded archive instead of fetching from WFS
    #[arg(long)]
    pub offline: bool,
}

/// Named datasets the pipeline knows how to ingest
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Dataset {
    /// Facility points from the local CSV
    Facilities,
    /// Watershed group polygons from the BC WFS endpoint
    WatershedGroups,
    /// Every dataset, in order
    All,
}
