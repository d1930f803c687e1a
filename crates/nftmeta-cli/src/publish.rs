//! Metadata document publishing
//!
//! Each document goes through three states. A [`DraftDocument`] is the
//! persisted JSON written to `{stem}.json.tmp`. Hashing the draft file gives
//! a [`HashedDocument`]. Renaming it to its final name gives a
//! [`PublishedDocument`] with its destination URL. The factory and the
//! default token are always named by hash; other tokens follow the factory's
//! `tokenUriTemplate`.

use crate::config::DestinationUrls;
use crate::error::{CliError, Result};
use crate::hasher::hash_file;
use crate::progress::create_spinner;
use nftmeta_common::types::{SerialNumber, Token, TokenUriTemplate};
use nftmeta_common::NftCollection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const DRAFT_SUFFIX: &str = ".json.tmp";

/// Candidate document on disk, not yet hashed
#[derive(Debug)]
pub struct DraftDocument {
    label: String,
    path: PathBuf,
}

/// Draft with its content digest
#[derive(Debug)]
pub struct HashedDocument {
    label: String,
    path: PathBuf,
    hash: String,
}

/// Document at its final name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    pub hash: String,
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedToken {
    pub serial_number: Option<SerialNumber>,
    pub document: PublishedDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCollection {
    pub factory: PublishedDocument,
    pub default_token: Option<PublishedDocument>,
    pub tokens: Vec<PublishedToken>,
}

impl DraftDocument {
    /// Write `value` as pretty JSON to `{dir}/{stem}.json.tmp`
    pub async fn write(
        dir: &Path,
        stem: &str,
        label: impl Into<String>,
        value: &Value,
    ) -> Result<Self> {
        let label = label.into();
        let path = dir.join(format!("{}{}", stem, DRAFT_SUFFIX));
        let content = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CliError::publish(&label, e))?;
        Ok(Self { label, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn hash(self) -> Result<HashedDocument> {
        let hash = hash_file(&self.path)
            .await
            .map_err(|e| CliError::publish(&self.label, e))?;
        Ok(HashedDocument {
            label: self.label,
            path: self.path,
            hash,
        })
    }
}

impl HashedDocument {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Rename to `file_name`, or to the hash when `None`
    pub async fn publish(
        self,
        file_name: Option<String>,
        destinations: &DestinationUrls,
    ) -> Result<PublishedDocument> {
        let file_name = file_name.unwrap_or_else(|| self.hash.clone());
        let Some(dir) = self.path.parent() else {
            return Err(CliError::publish(&self.label, "draft has no parent directory"));
        };
        let target = dir.join(&file_name);

        tokio::fs::rename(&self.path, &target)
            .await
            .map_err(|e| CliError::publish(&self.label, e))?;

        let url = destinations.url_for(&file_name);
        debug!(document = %self.label, hash = %self.hash, url = %url, "Published document");
        Ok(PublishedDocument {
            hash: self.hash,
            file_name,
            path: target,
            url,
        })
    }
}

/// Publishes the documents of one collection into an output directory
pub struct DocumentPublisher<'d> {
    output_dir: PathBuf,
    destinations: &'d DestinationUrls,
}

impl<'d> DocumentPublisher<'d> {
    pub fn new(output_dir: impl Into<PathBuf>, destinations: &'d DestinationUrls) -> Self {
        Self {
            output_dir: output_dir.into(),
            destinations,
        }
    }

    #[instrument(skip_all, fields(output_dir = %self.output_dir.display()))]
    pub async fn publish(&self, collection: &NftCollection) -> Result<PublishedCollection> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let template = collection.factory.token_uri_template();
        let spinner = create_spinner("Publishing metadata documents");

        let factory = self
            .publish_one("factory", "factory", &collection.factory.persisted_json()?, None)
            .await?;

        let default_token = match &collection.default_token {
            Some(token) => Some(
                self.publish_one("defaultToken", "default token", &token.persisted_json()?, None)
                    .await?,
            ),
            None => None,
        };

        let mut tokens = Vec::with_capacity(collection.tokens.len());
        for (index, token) in collection.tokens.iter().enumerate() {
            let label = match &token.serial_number {
                Some(serial) => format!("token {}", serial),
                None => format!("token #{}", index),
            };
            let document = self
                .publish_one(
                    &format!("token-{}", index),
                    &label,
                    &token.persisted_json()?,
                    token_file_name(token, template, &label)?,
                )
                .await?;
            tokens.push(PublishedToken {
                serial_number: token.serial_number.clone(),
                document,
            });
        }

        spinner.finish_and_clear();
        info!(
            factory = %factory.hash,
            default_token = default_token.is_some(),
            tokens = tokens.len(),
            "Published metadata documents"
        );

        Ok(PublishedCollection {
            factory,
            default_token,
            tokens,
        })
    }

    async fn publish_one(
        &self,
        stem: &str,
        label: &str,
        value: &Value,
        file_name: Option<String>,
    ) -> Result<PublishedDocument> {
        DraftDocument::write(&self.output_dir, stem, label, value)
            .await?
            .hash()
            .await?
            .publish(file_name, self.destinations)
            .await
    }
}

/// Final name of a non-default token, `None` meaning its hash
fn token_file_name(
    token: &Token,
    template: TokenUriTemplate,
    label: &str,
) -> Result<Option<String>> {
    match (template, &token.serial_number) {
        (TokenUriTemplate::SerialNumber, Some(serial)) if serial.is_path_segment() => {
            Ok(Some(serial.to_string()))
        },
        (TokenUriTemplate::SerialNumber, Some(serial)) => Err(CliError::publish(
            label,
            format!("serial number '{}' cannot be used as a file name", serial),
        )),
        (TokenUriTemplate::SerialNumber, None) => {
            warn!(name = %token.metadata.name, "Token without serial number is addressed by hash");
            Ok(None)
        },
        (TokenUriTemplate::Hash, _) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use nftmeta_common::checksum::hash_bytes;
    use nftmeta_common::types::{Factory, Media, Metadata, StaticResource, DEFAULT_LOCALE};
    use tempfile::TempDir;

    fn metadata(name: &str) -> Metadata {
        Metadata {
            spec_version: "0.1".to_string(),
            asset_type: None,
            name: name.to_string(),
            sub_name: None,
            description: None,
            author: None,
            default_locale: DEFAULT_LOCALE.to_string(),
            media: Media {
                product: StaticResource::from_uri("https://cdn.example.com/p.png", None),
                square: StaticResource::from_uri("https://cdn.example.com/s.png", None),
                hero: None,
                gallery: None,
            },
            properties: None,
            resources: None,
        }
    }

    fn token(serial: &str) -> Token {
        Token {
            serial_number: Some(SerialNumber::from(serial)),
            metadata: metadata(&format!("Taco {}", serial)),
            attributes: None,
            dynamic_attributes: None,
            dynamic_resources: None,
        }
    }

    fn collection(template: Option<TokenUriTemplate>) -> NftCollection {
        let factory = Factory {
            metadata: metadata("Tacos"),
            token_uri_template: template,
            attributes: None,
        };
        NftCollection::assemble(factory, None, vec![token("default"), token("1"), token("2")])
            .unwrap()
    }

    fn urls() -> DestinationUrls {
        DestinationUrls::new("https://cdn.example.com", "Tacos")
    }

    #[tokio::test]
    async fn test_hash_addressing() {
        let dir = TempDir::new().unwrap();
        let urls = urls();
        let published = DocumentPublisher::new(dir.path(), &urls)
            .publish(&collection(None))
            .await
            .unwrap();

        for token in &published.tokens {
            assert_eq!(token.document.file_name, token.document.hash);
        }
        let factory = &published.factory;
        assert_eq!(factory.url, format!("https://cdn.example.com/Tacos/{}", factory.hash));

        let bytes = std::fs::read(&factory.path).unwrap();
        assert_eq!(hash_bytes(&bytes), factory.hash);
    }

    #[tokio::test]
    async fn test_serial_addressing() {
        let dir = TempDir::new().unwrap();
        let urls = urls();
        let published = DocumentPublisher::new(dir.path(), &urls)
            .publish(&collection(Some(TokenUriTemplate::SerialNumber)))
            .await
            .unwrap();

        let names: Vec<_> = published.tokens.iter().map(|t| t.document.file_name.as_str()).collect();
        assert_eq!(names, vec!["1", "2"]);
        assert_eq!(published.tokens[1].document.url, "https://cdn.example.com/Tacos/2");

        let default = published.default_token.unwrap();
        assert_eq!(default.file_name, default.hash);
        assert_eq!(published.factory.file_name, published.factory.hash);
    }

    #[tokio::test]
    async fn test_transient_fields_not_persisted() {
        let dir = TempDir::new().unwrap();
        let urls = urls();
        let published = DocumentPublisher::new(dir.path(), &urls)
            .publish(&collection(Some(TokenUriTemplate::SerialNumber)))
            .await
            .unwrap();

        let factory: Value =
            serde_json::from_slice(&std::fs::read(&published.factory.path).unwrap()).unwrap();
        assert!(factory.get("tokenUriTemplate").is_none());

        let token: Value =
            serde_json::from_slice(&std::fs::read(&published.tokens[0].document.path).unwrap())
                .unwrap();
        assert!(token.get("serialNumber").is_none());
        assert_eq!(token["name"], "Taco 1");
    }

    #[tokio::test]
    async fn test_no_drafts_left_behind() {
        let dir = TempDir::new().unwrap();
        let urls = urls();
        DocumentPublisher::new(dir.path(), &urls)
            .publish(&collection(None))
            .await
            .unwrap();

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(DRAFT_SUFFIX))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_draft_lifecycle() {
        let dir = TempDir::new().unwrap();
        let value = serde_json::json!({ "name": "Tacos" });

        let draft = DraftDocument::write(dir.path(), "factory", "factory", &value)
            .await
            .unwrap();
        assert!(draft.path().ends_with("factory.json.tmp"));

        let hashed = draft.hash().await.unwrap();
        let expected = hash_bytes(serde_json::to_string_pretty(&value).unwrap().as_bytes());
        assert_eq!(hashed.hash(), expected);

        let published = hashed.publish(Some("named".to_string()), &urls()).await.unwrap();
        assert!(published.path.ends_with("named"));
        assert!(!dir.path().join("factory.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_unsafe_serial_never_leaves_output_dir() {
        let root = TempDir::new().unwrap();
        let output = root.path().join("generated_metadata");
        let urls = urls();

        for serial in ["1/100", "../escaped"] {
            let mut collection = collection(Some(TokenUriTemplate::SerialNumber));
            collection.tokens[0].serial_number = Some(SerialNumber::from(serial));

            let err = DocumentPublisher::new(&output, &urls)
                .publish(&collection)
                .await
                .unwrap_err();
            assert!(matches!(err, CliError::Publish { .. }));
        }

        assert!(!root.path().join("escaped").exists());
        let entries: Vec<_> = std::fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("generated_metadata")]);
    }
}
