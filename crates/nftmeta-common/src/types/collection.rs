//! The root of a collection's metadata tree

use super::metadata::{Factory, Token, TokenUriTemplate};
use crate::error::{NftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Factory, optional default token and the ordered token list.
///
/// The default token is never also present in `tokens`, and serial numbers
/// are unique across `tokens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollection {
    pub factory: Factory,

    #[serde(default)]
    pub default_token: Option<Token>,

    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl NftCollection {
    /// Assemble a collection, extracting the sentinel-serial token as the
    /// default token.
    ///
    /// `default_token` is a separately supplied default (e.g. its own
    /// document). Supplying one and also carrying a sentinel row is an error,
    /// as are two sentinel rows or duplicate serial numbers. Under
    /// `{serial_number}` addressing every serial must also be usable as a
    /// single file name.
    pub fn assemble(
        factory: Factory,
        default_token: Option<Token>,
        tokens: Vec<Token>,
    ) -> Result<Self> {
        let mut default_token = default_token;
        let mut kept = Vec::with_capacity(tokens.len());

        for token in tokens {
            if token.is_default() {
                if default_token.is_some() {
                    return Err(NftError::DuplicateSerial(super::DEFAULT_SERIAL.to_string()));
                }
                default_token = Some(token);
            } else {
                kept.push(token);
            }
        }

        let collection = Self {
            factory,
            default_token,
            tokens: kept,
        };
        collection.check_unique_serials()?;
        if collection.factory.token_uri_template() == TokenUriTemplate::SerialNumber {
            collection.check_serial_file_names()?;
        }
        Ok(collection)
    }

    /// Fail on the first serial number that is not a single path segment
    pub fn check_serial_file_names(&self) -> Result<()> {
        for (index, token) in self.tokens.iter().enumerate() {
            if let Some(serial) = &token.serial_number {
                if !serial.is_path_segment() {
                    return Err(NftError::invalid_document(
                        format!("tokens[{}].serialNumber", index),
                        format!("serial number '{}' cannot be used as a file name", serial),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Fail on the first serial number used by two tokens
    pub fn check_unique_serials(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for serial in self.tokens.iter().filter_map(|t| t.serial_number.as_ref()) {
            if !seen.insert(serial.to_string()) {
                return Err(NftError::DuplicateSerial(serial.to_string()));
            }
        }
        Ok(())
    }

    /// Collection name as declared by the factory
    pub fn name(&self) -> &str {
        &self.factory.metadata.name
    }
}
