//! Content hasher
//!
//! Streams a remote body or a local file through SHA-256 without holding
//! the whole payload in memory.

use crate::error::{CliError, Result};
use futures::StreamExt;
use nftmeta_common::checksum::CHUNK_SIZE;
use nftmeta_common::{Diagnostics, Locator};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use url::Url;

/// Hashes locators relative to a working directory
#[derive(Debug, Clone)]
pub struct ContentHasher {
    client: reqwest::Client,
    working_dir: Option<PathBuf>,
}

impl ContentHasher {
    /// Remote fetches give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nftmeta/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            working_dir: None,
        })
    }

    /// Resolve local locators against `dir` instead of the process CWD
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Digest of the content behind `raw`
    pub async fn try_hash(&self, raw: &str) -> Result<String> {
        match Locator::parse(raw) {
            Locator::Remote(url) => self.hash_remote(&url).await,
            local => {
                let path = local
                    .resolve(self.working_dir.as_deref())
                    .ok_or_else(|| CliError::unreachable(raw, "not a local path"))?;
                hash_file(&path)
                    .await
                    .map_err(|e| CliError::unreachable(raw, e))
            },
        }
    }

    /// Digest of the content behind `raw`, or `None` with a recorded
    /// diagnostic when it cannot be read
    pub async fn hash(&self, raw: &str, diagnostics: &mut Diagnostics) -> Option<String> {
        match self.try_hash(raw).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!(locator = %raw, error = %e, "Hash lookup failed");
                diagnostics.unreachable(raw);
                None
            },
        }
    }

    async fn hash_remote(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "Fetching remote resource");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CliError::unreachable(url.as_str(), e))?;

        let mut hasher = Sha256::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CliError::unreachable(url.as_str(), e))?;
            hasher.update(&chunk);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

/// Streamed digest of a local file
pub async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
