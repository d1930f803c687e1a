//! Resource locator parsing
//!
//! A URI inside a resource is either an absolute `http`/`https` URL, which is
//! already hosted, or a path relative to the collection's working directory.
//! Local paths are taken verbatim, so `?` and `#` are ordinary filename
//! characters there.

use std::path::{Path, PathBuf};
use url::Url;

/// A parsed resource URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Absolute http(s) URL
    Remote(Url),
    /// Path relative to the working directory (or absolute on disk)
    Local(String),
}

impl Locator {
    /// Parse a raw URI string.
    ///
    /// Any other scheme (or no scheme at all) is treated as a local path.
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
                Locator::Remote(url)
            },
            _ => Locator::Local(raw.to_string()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Locator::Remote(_))
    }

    /// Resolve a local locator against the working directory.
    ///
    /// Returns `None` for remote locators.
    pub fn resolve(&self, working_dir: Option<&Path>) -> Option<PathBuf> {
        match self {
            Locator::Remote(_) => None,
            Locator::Local(path) => Some(match working_dir {
                Some(dir) => dir.join(path),
                None => PathBuf::from(path),
            }),
        }
    }

    /// Extension of the final path segment, without the dot.
    ///
    /// Only plain ASCII alphanumeric extensions count, so a local name like
    /// `x.png?v=2` has none.
    pub fn extension(&self) -> Option<&str> {
        let path = match self {
            Locator::Remote(url) => url.path(),
            Locator::Local(path) => path.as_str(),
        };
        let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
        match segment.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Some(ext)
            },
            _ => None,
        }
    }
}

/// Remove the query string (and fragment) from a URL-shaped string
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
