//! nftmeta-ingest - print the normalized metadata tree of a collection

use anyhow::Result;
use clap::Parser;
use nftmeta_common::logging::{init_logging, LogConfig, LogLevel};
use nftmeta_common::Diagnostics;
use nftmeta_ingest::{load, InputFormat};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nftmeta-ingest")]
#[command(author, version, about = "Normalize an NFT collection directory and print it as JSON")]
struct Cli {
    /// Collection directory
    dir: PathBuf,

    /// Force the input layout instead of detecting it
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("nftmeta-ingest")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let mut diagnostics = Diagnostics::new();
    let collection = load(&cli.dir, cli.format, &mut diagnostics)?;

    println!("{}", serde_json::to_string_pretty(&collection)?);
    info!(diagnostics = diagnostics.len(), "Ingestion complete");
    Ok(())
}
