//! nftmeta common library
//!
//! Shared types, utilities, and error handling for the nftmeta workspace.
//!
//! # Overview
//!
//! - **Types**: the canonical metadata tree (factory, default token, tokens)
//! - **Visiting**: typed access to every static resource in the tree
//! - **Checksums**: streaming SHA-256 digests and digest combination
//! - **Classification**: extension-based content types, remote/local locators
//! - **Diagnostics**: ordered log of non-fatal conditions for one run
//! - **Logging**: `tracing` subscriber setup shared by all binaries
//!
//! # Example
//!
//! ```
//! use nftmeta_common::checksum::{combine_digests, hash_bytes};
//!
//! let digest = combine_digests([hash_bytes(b"front"), hash_bytes(b"back")]);
//! assert_eq!(digest.len(), 64);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod logging;
pub mod mime;
pub mod types;
pub mod visit;

// Re-export commonly used types
pub use diagnostics::{DiagnosticKind, Diagnostics};
pub use error::{NftError, Result};
pub use locator::Locator;
pub use types::NftCollection;
pub use visit::{ResourceSlot, StaticResources};
