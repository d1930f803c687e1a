//! Error types for nftmeta

use thiserror::Error;

/// Result type alias for nftmeta operations
pub type Result<T> = std::result::Result<T, NftError>;

/// Main error type for nftmeta
#[derive(Error, Debug)]
pub enum NftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A document the pipeline cannot run without (e.g. the factory)
    #[error("Required {document} document not found in '{directory}'")]
    MissingDocument { document: String, directory: String },

    #[error("Failed to parse {file}: {message}")]
    InvalidDocument { file: String, message: String },

    #[error("Duplicate serial number '{0}' in collection")]
    DuplicateSerial(String),

    /// The rewriter met a local URI whose resource was never hashed
    #[error("Integrity hash not found for '{uri}' at {path}")]
    MissingIntegrity { path: String, uri: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unreachable resource: {0}")]
    Unreachable(String),
}

impl NftError {
    /// Create a missing document error
    pub fn missing_document(document: impl Into<String>, directory: impl Into<String>) -> Self {
        Self::MissingDocument {
            document: document.into(),
            directory: directory.into(),
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
