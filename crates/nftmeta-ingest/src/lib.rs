//! nftmeta ingest library
//!
//! Turns a collection directory into the canonical metadata tree.
//!
//! # Supported Layouts
//!
//! - **Tabular**: `factory.csv` (first row) and `tokens.csv`
//! - **Discrete JSON**: `factory.json`, `defaultToken.json`, `*.token.json`
//!
//! # Example
//!
//! ```no_run
//! use nftmeta_common::Diagnostics;
//! use nftmeta_ingest::load;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut diagnostics = Diagnostics::new();
//!     let collection = load("./collection", None, &mut diagnostics)?;
//!     println!("{} tokens", collection.tokens.len());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod documents;
pub mod layout;
pub mod tabular;

pub use layout::InputFormat;

use nftmeta_common::mime::known_mime_type;
use nftmeta_common::{DiagnosticKind, Diagnostics, NftCollection, Result};
use std::path::Path;
use tracing::info;

/// Content type for a resource URI, recording a diagnostic when unknown
pub(crate) fn classify(uri: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    match known_mime_type(uri) {
        Some(mime) => Some(mime.to_string()),
        None => {
            diagnostics.record(
                DiagnosticKind::UnsupportedFileType,
                format!("'{}' is not a supported file type", uri),
            );
            None
        },
    }
}

/// Detect the layout of `dir` and normalize it.
///
/// A missing factory is fatal. A missing default token is only recorded.
pub fn load(
    dir: impl AsRef<Path>,
    format: Option<InputFormat>,
    diagnostics: &mut Diagnostics,
) -> Result<NftCollection> {
    let dir = dir.as_ref();
    let format = layout::detect(dir, format, diagnostics)?;
    info!(dir = %dir.display(), format = %format, "Reading collection");

    let collection = match format {
        InputFormat::Csv => tabular::parse(dir, diagnostics)?,
        InputFormat::Json => documents::parse(dir, diagnostics)?,
    };

    if collection.default_token.is_none() {
        diagnostics.record(
            DiagnosticKind::MissingDefaultToken,
            format!("Collection '{}' has no default token", collection.name()),
        );
    }

    info!(
        collection = %collection.name(),
        tokens = collection.tokens.len(),
        "Collection normalized"
    );
    Ok(collection)
}
