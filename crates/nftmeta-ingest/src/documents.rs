//! Discrete-document normalizer
//!
//! `factory.json` is required. `defaultToken.json` is optional, and every
//! `<stem>.token.json` holds one token. Documents are already structured, so
//! the only normalization is ordering, serial numbers and content types.

use crate::classify;
use crate::layout::{DEFAULT_TOKEN_JSON, FACTORY_JSON, TOKEN_JSON_SUFFIX};
use nftmeta_common::checksum::is_digest;
use nftmeta_common::types::{Factory, SerialNumber, Token};
use nftmeta_common::{Diagnostics, NftCollection, NftError, Result, StaticResources};
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| NftError::invalid_document(path.display().to_string(), e.to_string()))
}

/// Numeric stems in numeric order first, then the rest lexically
fn natural_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// `(stem, path)` for every token document in `dir`, naturally ordered
fn token_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_suffix(TOKEN_JSON_SUFFIX))
            .filter(|stem| !stem.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        files.push((stem, path));
    }

    files.sort_by(|(a, _), (b, _)| natural_order(a, b));
    Ok(files)
}

/// Fill in content types that were left out or empty
fn fill_content_types(collection: &mut NftCollection, diagnostics: &mut Diagnostics) {
    for slot in collection.static_resources_mut() {
        let declared = slot
            .resource
            .content_type
            .as_deref()
            .is_some_and(|kind| !kind.is_empty());
        if declared {
            continue;
        }
        slot.resource.content_type = slot
            .resource
            .uris
            .first()
            .and_then(|uri| classify(uri, diagnostics));
    }
}

/// Reject declared integrity hashes that are not SHA-256 hex digests
fn check_declared_integrity(collection: &mut NftCollection) -> Result<()> {
    for slot in collection.static_resources_mut() {
        if let Some(hash) = slot.resource.hash() {
            if !is_digest(hash) {
                return Err(NftError::invalid_document(
                    slot.path,
                    format!("integrity hash '{}' is not a SHA-256 hex digest", hash),
                ));
            }
        }
    }
    Ok(())
}

/// Normalize a discrete-document collection directory
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn parse(dir: &Path, diagnostics: &mut Diagnostics) -> Result<NftCollection> {
    let factory_path = dir.join(FACTORY_JSON);
    if !factory_path.is_file() {
        return Err(NftError::missing_document(FACTORY_JSON, dir.display().to_string()));
    }
    let factory: Factory = read_document(&factory_path)?;

    let default_path = dir.join(DEFAULT_TOKEN_JSON);
    let default_token: Option<Token> = if default_path.is_file() {
        Some(read_document(&default_path)?)
    } else {
        None
    };

    let mut tokens = Vec::new();
    for (stem, path) in token_files(dir)? {
        let mut token: Token = read_document(&path)?;
        if token.serial_number.is_none() {
            token.serial_number = Some(SerialNumber::Text(stem));
        }
        tokens.push(token);
    }
    debug!(count = tokens.len(), "Read token documents");

    let mut collection = NftCollection::assemble(factory, default_token, tokens)?;
    check_declared_integrity(&mut collection)?;
    fill_content_types(&mut collection, diagnostics);
    Ok(collection)
}
