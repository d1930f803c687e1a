//! Run configuration
//!
//! Environments are named base URLs read from `config.json` and overlaid
//! with `NFTMETA_ENVIRONMENTS__<NAME>` variables. A run resolves exactly one
//! of them and combines it with the collection name to build every
//! destination URL.

use crate::error::{CliError, Result};
use config::{Config, Environment, File, FileFormat};
use nftmeta_common::locator::strip_query;
use nftmeta_common::NftCollection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment registry read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Prefix of environment variables that add or override registry entries
pub const ENVIRONMENTS_ENV_PREFIX: &str = "NFTMETA_ENVIRONMENTS";

/// Environment name used when the URL is passed explicitly
pub const CUSTOM_ENVIRONMENT: &str = "custom";

/// Staging directory for hash-named media copies
pub const DEFAULT_GENERATED_MEDIA_DIR: &str = "generated_media";

/// Output directory for published metadata documents
pub const DEFAULT_GENERATED_METADATA_DIR: &str = "generated_metadata";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 1;

/// Environment name to base URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentRegistry {
    environments: BTreeMap<String, String>,
}

/// The environment a run publishes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEnvironment {
    pub name: String,
    /// Validated http(s) URL without trailing slash
    pub url: String,
}

impl EnvironmentRegistry {
    /// Load the registry from a JSON file (optional) plus the environment
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(Environment::with_prefix(ENVIRONMENTS_ENV_PREFIX).prefix_separator("__"))
            .build()?;

        let environments: BTreeMap<String, String> = settings.try_deserialize()?;
        Ok(Self::from_entries(environments))
    }

    /// Build a registry from pairs. Names are case-insensitive.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            environments: entries
                .into_iter()
                .map(|(name, url)| (name.as_ref().to_lowercase(), url.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.environments.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Pick the environment for this run.
    ///
    /// An explicit URL wins, then a named entry, then the only entry.
    pub fn resolve(&self, env: Option<&str>, env_url: Option<&str>) -> Result<ResolvedEnvironment> {
        if let Some(url) = env_url {
            return Ok(ResolvedEnvironment {
                name: CUSTOM_ENVIRONMENT.to_string(),
                url: normalize_environment_url(url)?,
            });
        }

        if let Some(name) = env {
            let url = self.get(name).ok_or_else(|| {
                CliError::config(format!(
                    "Unknown environment '{}' (known: {})",
                    name,
                    self.names().join(", ")
                ))
            })?;
            return Ok(ResolvedEnvironment {
                name: name.to_lowercase(),
                url: normalize_environment_url(url)?,
            });
        }

        match self.environments.iter().next() {
            Some((name, url)) if self.len() == 1 => Ok(ResolvedEnvironment {
                name: name.clone(),
                url: normalize_environment_url(url)?,
            }),
            _ if self.is_empty() => Err(CliError::config("No environments configured")),
            _ => Err(CliError::config(format!(
                "Several environments configured ({}), choose one",
                self.names().join(", ")
            ))),
        }
    }
}

/// Validate an environment URL and drop any trailing slash
pub fn normalize_environment_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|e| CliError::config(format!("Invalid environment URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(CliError::config(format!(
            "Environment URL '{}' must be an absolute http(s) URL",
            raw
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Builds destination URLs for one collection in one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUrls {
    base: String,
    collection_segment: String,
}

impl DestinationUrls {
    pub fn new(environment_url: &str, collection_name: &str) -> Self {
        let compact: String = collection_name.chars().filter(|c| !c.is_whitespace()).collect();
        Self {
            base: environment_url.trim_end_matches('/').to_string(),
            collection_segment: urlencoding::encode(&compact).into_owned(),
        }
    }

    /// Collection name with whitespace removed, percent-encoded
    pub fn collection_segment(&self) -> &str {
        &self.collection_segment
    }

    /// `{base}/{collection}/{file_name}` without query string
    pub fn url_for(&self, file_name: &str) -> String {
        let url = format!("{}/{}/{}", self.base, self.collection_segment, file_name);
        strip_query(&url).to_string()
    }
}

/// Settings for one `process` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub environment: String,
    pub environment_url: String,

    /// Overrides the factory name as the collection path segment
    pub collection_name: Option<String>,

    pub generated_media_dir: String,
    pub generated_metadata_dir: String,
    pub fetch_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
}

impl RunConfig {
    pub fn new(environment: ResolvedEnvironment) -> Self {
        Self {
            environment: environment.name,
            environment_url: environment.url,
            collection_name: None,
            generated_media_dir: DEFAULT_GENERATED_MEDIA_DIR.to_string(),
            generated_metadata_dir: DEFAULT_GENERATED_METADATA_DIR.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Collection name used in URLs: the override, else the factory name
    pub fn collection_name_for<'a>(&'a self, collection: &'a NftCollection) -> &'a str {
        self.collection_name.as_deref().unwrap_or_else(|| collection.name())
    }

    pub fn destinations(&self, collection: &NftCollection) -> DestinationUrls {
        DestinationUrls::new(&self.environment_url, self.collection_name_for(collection))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
