//! `nftmeta hash` command implementation
//!
//! Prints the raw SHA-256 digest of one locator. This is the per-URI digest;
//! a resource's integrity hash is derived from these.

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::error::Result;
use crate::hasher::ContentHasher;
use std::path::PathBuf;
use std::time::Duration;

pub async fn run(locator: &str, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let hasher = ContentHasher::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))?
        .with_working_dir(dir);
    let digest = hasher.try_hash(locator).await?;

    println!("{}", digest);
    Ok(())
}
