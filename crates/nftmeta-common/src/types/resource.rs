//! Resource types: references to external media plus integrity metadata

use serde::{Deserialize, Serialize};

/// Integrity algorithm. Only SHA-256 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntegrityAlgorithm {
    #[default]
    #[serde(rename = "SHA256")]
    Sha256,
}

impl std::fmt::Display for IntegrityAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityAlgorithm::Sha256 => write!(f, "SHA256"),
        }
    }
}

/// Content hash of a resource, also used as its published file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Integrity {
    #[serde(rename = "type")]
    pub algorithm: IntegrityAlgorithm,

    /// 64 lowercase hex characters
    pub hash: String,
}

impl Integrity {
    pub fn sha256(hash: impl Into<String>) -> Self {
        Self {
            algorithm: IntegrityAlgorithm::Sha256,
            hash: hash.into(),
        }
    }
}

/// A resource whose content is fixed and verifiable.
///
/// `integrity` stays `None` until the integrity walker hashes the resource.
/// Once set it is never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticResource {
    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub uris: Vec<String>,

    #[serde(default)]
    pub integrity: Option<Integrity>,
}

impl StaticResource {
    /// A not-yet-hashed resource for a single URI
    pub fn from_uri(uri: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            content_type,
            uris: vec![uri.into()],
            integrity: None,
        }
    }

    pub fn is_hashed(&self) -> bool {
        self.integrity.is_some()
    }

    pub fn hash(&self) -> Option<&str> {
        self.integrity.as_ref().map(|i| i.hash.as_str())
    }
}

/// A resource expected to change over time; never hashed or rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicResource {
    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub uris: Vec<String>,
}
