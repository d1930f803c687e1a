//! nftmeta CLI - Main entry point

use clap::Parser;
use nftmeta_cli::{Cli, Commands};
use nftmeta_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("nftmeta")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(command: Commands) -> nftmeta_cli::Result<()> {
    match command {
        Commands::Process(args) => nftmeta_cli::commands::process::run(args).await,
        Commands::Hash { locator, dir } => nftmeta_cli::commands::hash::run(&locator, dir).await,
        Commands::Classify { path } => nftmeta_cli::commands::classify::run(&path),
    }
}
