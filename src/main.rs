//! AIS archive utility
//!
//! Usage: `ais-archive <OUTPUT_DIR> <INPUT_FILE>`. No flags.
//!
//! Settings come from an optional `.env`, an optional `config/default` file
//! and optional `AISARCHIVE__*` environment variables. All of them are
//! overrides; without any of them the built-in defaults apply.

use std::path::PathBuf;

use ais_archive::{config::AppConfig, errors::AisArchiveError, pipeline::Pipeline};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ais-archive",
    about = "Decode AIVDM sentences into a partitioned Parquet dataset"
)]
struct Cli {
    /// Output dataset directory
    output: PathBuf,
    /// Input file with one tagged AIVDM sentence per line
    input: PathBuf,
}

fn main() -> Result<(), AisArchiveError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Configuration from .env, config/default and AISARCHIVE__* variables
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;
    config.validate()?;

    let stats = Pipeline::new(config).run(&cli.input, &cli.output)?;
    info!("Wrote {} rows to {}", stats.messages, cli.output.display());

    Ok(())
}
