//! Error types for the nftmeta CLI
//!
//! Messages are user-facing and say what to check next.

use nftmeta_common::NftError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Normalizing, walking or rewriting the collection failed
    #[error(transparent)]
    Pipeline(#[from] NftError),

    /// Environment could not be resolved or a setting is invalid
    #[error("Configuration error: {0}. Pass --env-url, or --env with a name listed in config.json.")]
    Config(String),

    /// config.json or NFTMETA_ENVIRONMENTS__* could not be read
    #[error("Failed to load environment registry: {0}. Check that config.json maps names to URLs.")]
    Registry(#[from] config::ConfigError),

    /// A locator could not be hashed
    #[error("Resource '{locator}' could not be reached: {reason}")]
    Unreachable { locator: String, reason: String },

    /// A metadata document could not be written, hashed or renamed
    #[error("Failed to publish {document}: {message}")]
    Publish { document: String, message: String },

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and the resource URL.")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unreachable resource error
    pub fn unreachable(locator: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Unreachable {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a publish error
    pub fn publish(document: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Publish {
            document: document.into(),
            message: message.to_string(),
        }
    }
}
