//! nftmeta CLI Library
//!
//! Prepares an NFT collection directory for hosting.
//!
//! # Overview
//!
//! `nftmeta process` reads a collection (tabular or discrete JSON), hashes
//! every static resource, rewrites local media to content-addressed URLs,
//! publishes the metadata documents and writes an upload plan:
//!
//! - **Hashing**: streaming SHA-256 of local files and remote URLs ([`hasher`], [`integrity`])
//! - **Rewriting**: destination URLs and the staged media map ([`rewrite`])
//! - **Publishing**: hash- or serial-named metadata documents ([`publish`])
//! - **Planning**: `upload.json` for the upload step ([`upload`])
//! - **Configuration**: environment registry and run settings ([`config`])

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod config;
pub mod error;
pub mod hasher;
pub mod integrity;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod rewrite;
pub mod upload;

// Re-export commonly used types
pub use crate::config::RunConfig;
pub use error::{CliError, Result};
pub use upload::UploadPlan;

use clap::{Args, Parser, Subcommand};
use crate::config::{
    DEFAULT_CONFIG_FILE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_GENERATED_MEDIA_DIR,
    DEFAULT_GENERATED_METADATA_DIR, DEFAULT_MAX_CONCURRENT_FETCHES,
};
use nftmeta_ingest::InputFormat;
use std::path::PathBuf;

/// nftmeta - NFT collection metadata pipeline
#[derive(Parser, Debug)]
#[command(name = "nftmeta")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the command reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash, rewrite and publish a collection, then write upload.json
    Process(ProcessArgs),

    /// Print the SHA-256 digest of a file or URL
    Hash {
        /// Local path or http(s) URL
        locator: String,

        /// Directory local paths are relative to
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Print the content type derived from a path's extension
    Classify {
        /// File path or URL
        path: String,
    },
}

/// Arguments of `nftmeta process`
#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Collection directory
    pub dir: PathBuf,

    /// Force the input layout instead of detecting it
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Environment name from the registry
    #[arg(short, long, env = "NFTMETA_ENV")]
    pub env: Option<String>,

    /// Environment base URL, bypassing the registry
    #[arg(long, env = "NFTMETA_ENV_URL")]
    pub env_url: Option<String>,

    /// Collection name used in URLs (defaults to the factory name)
    #[arg(long)]
    pub collection_name: Option<String>,

    /// Environment registry file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Staging directory for media, relative to the collection
    #[arg(long, default_value = DEFAULT_GENERATED_MEDIA_DIR)]
    pub media_dir: String,

    /// Output directory for metadata documents, relative to the collection
    #[arg(long, default_value = DEFAULT_GENERATED_METADATA_DIR)]
    pub metadata_dir: String,

    /// Resources hashed at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub concurrency: usize,

    /// Timeout for each remote fetch, in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}
