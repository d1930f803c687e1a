//! URL rewriter
//!
//! Every local URI of a hashed static resource is replaced by its
//! destination URL `{env}/{collection}/{hash}.{ext}`. The file is copied to
//! `{working_dir}/{media_dir}/{hash}.{ext}` and the staged path is recorded
//! in the URL map. Remote URIs are already hosted and stay as they are.

use crate::config::DestinationUrls;
use crate::error::Result;
use nftmeta_common::{Locator, NftError, ResourceSlot, StaticResources};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Staged media path (relative, `/`-separated) to destination URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlMap(BTreeMap<String, String>);

impl UrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, staged_path: impl Into<String>, url: impl Into<String>) {
        self.0.insert(staged_path.into(), url.into());
    }

    pub fn get(&self, staged_path: &str) -> Option<&str> {
        self.0.get(staged_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Destination file name for a resource hash and an optional extension
pub fn destination_file_name(hash: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", hash, ext),
        None => hash.to_string(),
    }
}

/// Rewrites local URIs for one run and owns that run's URL map
pub struct UrlRewriter<'d> {
    destinations: &'d DestinationUrls,
    working_dir: PathBuf,
    media_dir: String,
    url_map: UrlMap,
}

impl<'d> UrlRewriter<'d> {
    pub fn new(
        destinations: &'d DestinationUrls,
        working_dir: impl Into<PathBuf>,
        media_dir: impl Into<String>,
    ) -> Self {
        Self {
            destinations,
            working_dir: working_dir.into(),
            media_dir: media_dir.into(),
            url_map: UrlMap::new(),
        }
    }

    fn staging_dir(&self) -> PathBuf {
        self.working_dir.join(&self.media_dir)
    }

    /// Rewrite every static resource of `tree` in place.
    ///
    /// Returns how many URIs were rewritten. A local URI on a resource
    /// without integrity fails the run: the walker must have hashed it first.
    #[instrument(skip_all, fields(working_dir = %self.working_dir.display()))]
    pub async fn replace_urls<T>(&mut self, tree: &mut T) -> Result<usize>
    where
        T: StaticResources + ?Sized,
    {
        let mut rewritten = 0;
        for slot in tree.static_resources_mut() {
            rewritten += self.rewrite_slot(slot).await?;
        }
        info!(rewritten, staged = self.url_map.len(), "URL rewrite complete");
        Ok(rewritten)
    }

    async fn rewrite_slot(&mut self, slot: ResourceSlot<'_>) -> Result<usize> {
        let hash = slot.resource.hash().map(str::to_string);
        let mut rewritten = 0;

        for uri in slot.resource.uris.iter_mut() {
            let locator = Locator::parse(uri);
            if locator.is_remote() {
                continue;
            }

            let digest = hash.as_deref().ok_or_else(|| NftError::MissingIntegrity {
                path: slot.path.clone(),
                uri: uri.clone(),
            })?;

            let file_name = destination_file_name(digest, locator.extension());
            let url = self.destinations.url_for(&file_name);

            let source = locator
                .resolve(Some(&self.working_dir))
                .ok_or_else(|| NftError::Unreachable(uri.clone()))?;
            self.stage(&source, &file_name).await?;

            self.url_map
                .insert(format!("{}/{}", self.media_dir, file_name), url.clone());
            debug!(path = %slot.path, from = %uri, to = %url, "Rewrote URI");
            *uri = url;
            rewritten += 1;
        }

        Ok(rewritten)
    }

    /// Copy `source` into the staging directory under `file_name`
    async fn stage(&self, source: &Path, file_name: &str) -> Result<()> {
        let staging_dir = self.staging_dir();
        tokio::fs::create_dir_all(&staging_dir).await?;
        tokio::fs::copy(source, staging_dir.join(file_name)).await?;
        Ok(())
    }

    pub fn into_url_map(self) -> UrlMap {
        self.url_map
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use nftmeta_common::checksum::hash_bytes;
    use nftmeta_common::types::{Integrity, Media, StaticResource};
    use tempfile::TempDir;

    const HASH: &str = "3f1d0c4a9b7e6d5c4b3a29181706f5e4d3c2b1a09f8e7d6c5b4a39281706f5e4";

    fn hashed(uris: &[&str]) -> StaticResource {
        StaticResource {
            content_type: Some("image/png".to_string()),
            uris: uris.iter().map(|u| u.to_string()).collect(),
            integrity: Some(Integrity::sha256(HASH)),
        }
    }

    fn media(product: StaticResource) -> Media {
        Media {
            product,
            square: hashed(&["https://example.com/square.png"]),
            hero: None,
            gallery: None,
        }
    }

    fn fixture() -> (TempDir, DestinationUrls) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/x.png"), b"0123456789").unwrap();
        (dir, DestinationUrls::new("https://cdn.example.com", "Tacos"))
    }

    #[tokio::test]
    async fn test_local_uri_rewritten_with_extension() {
        let (dir, urls) = fixture();
        let mut rewriter = UrlRewriter::new(&urls, dir.path(), "generated_media");
        let mut tree = media(hashed(&["images/x.png"]));

        let count = rewriter.replace_urls(&mut tree).await.unwrap();

        let expected = format!("https://cdn.example.com/Tacos/{}.png", HASH);
        assert_eq!(count, 1);
        assert_eq!(tree.product.uris, vec![expected.clone()]);

        let staged = dir.path().join("generated_media").join(format!("{}.png", HASH));
        assert_eq!(std::fs::read(&staged).unwrap(), b"0123456789");
        assert!(dir.path().join("images/x.png").exists());

        let map = rewriter.into_url_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&format!("generated_media/{}.png", HASH)), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_remote_uri_untouched() {
        let (dir, urls) = fixture();
        let mut rewriter = UrlRewriter::new(&urls, dir.path(), "generated_media");
        let mut tree = media(hashed(&["https://example.com/a.png?size=large"]));

        let count = rewriter.replace_urls(&mut tree).await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(tree.product.uris, vec!["https://example.com/a.png?size=large"]);
        assert_eq!(tree.square.uris, vec!["https://example.com/square.png"]);
        assert!(rewriter.into_url_map().is_empty());
    }

    #[tokio::test]
    async fn test_local_name_with_hash_sign_is_staged() {
        let (dir, urls) = fixture();
        std::fs::write(dir.path().join("images/Taco #1.png"), b"taco one").unwrap();
        let mut rewriter = UrlRewriter::new(&urls, dir.path(), "generated_media");
        let mut tree = media(hashed(&["images/Taco #1.png"]));

        rewriter.replace_urls(&mut tree).await.unwrap();

        let expected = format!("https://cdn.example.com/Tacos/{}.png", HASH);
        assert_eq!(tree.product.uris, vec![expected]);
        let staged = dir.path().join("generated_media").join(format!("{}.png", HASH));
        assert_eq!(std::fs::read(staged).unwrap(), b"taco one");
    }

    #[tokio::test]
    async fn test_every_rewrite_has_one_map_entry() {
        let (dir, urls) = fixture();
        std::fs::write(dir.path().join("images/y.gif"), b"gif").unwrap();
        let mut rewriter = UrlRewriter::new(&urls, dir.path(), "staged");

        let mut product = hashed(&["images/x.png"]);
        product.integrity = Some(Integrity::sha256(hash_bytes(b"x")));
        let mut tree = Media {
            product,
            square: hashed(&["images/y.gif"]),
            hero: Some(hashed(&["https://example.com/hero.png"])),
            gallery: None,
        };

        rewriter.replace_urls(&mut tree).await.unwrap();
        let map = rewriter.into_url_map();
        let contains_url = |url: &str| map.iter().any(|(_, v)| v == url);

        assert_eq!(map.len(), 2);
        for uri in tree.product.uris.iter().chain(&tree.square.uris) {
            assert!(contains_url(uri.as_str()));
        }
        assert!(!contains_url("https://example.com/hero.png"));
        assert!(map.iter().all(|(path, _)| path.starts_with("staged/")));
    }

    #[tokio::test]
    async fn test_missing_integrity_fails() {
        let (dir, urls) = fixture();
        let mut rewriter = UrlRewriter::new(&urls, dir.path(), "generated_media");
        let mut tree = media(StaticResource::from_uri("images/x.png", None));

        let err = rewriter.replace_urls(&mut tree).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Pipeline(NftError::MissingIntegrity { ref path, .. }) if path == "product"
        ));
    }

    #[test]
    fn test_destination_file_name() {
        assert_eq!(destination_file_name("ab", Some("png")), "ab.png");
        assert_eq!(destination_file_name("ab", None), "ab");
    }
}
