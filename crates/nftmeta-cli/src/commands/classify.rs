//! `nftmeta classify` command implementation

use crate::error::Result;
use nftmeta_common::mime::path_to_mime_type;

/// Print the content type for `path`, or "unknown"
pub fn run(path: &str) -> Result<()> {
    println!("{}", path_to_mime_type(path));
    Ok(())
}
