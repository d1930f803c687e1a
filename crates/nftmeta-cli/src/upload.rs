//! Upload plan
//!
//! `upload.json` lists everything a run produced: the published metadata
//! documents, the staged media and where each one is expected to live.

use crate::config::RunConfig;
use crate::error::Result;
use crate::publish::{PublishedCollection, PublishedDocument};
use crate::rewrite::UrlMap;
use chrono::{DateTime, Utc};
use nftmeta_common::types::{SerialNumber, TokenUriTemplate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const UPLOAD_PLAN_FILE: &str = "upload.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEnvironment {
    pub env: String,
    pub url: String,
    pub token_uri_template: TokenUriTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub hash: String,
    pub url: String,
}

impl From<&PublishedDocument> for PlanDocument {
    fn from(doc: &PublishedDocument) -> Self {
        Self {
            hash: doc.hash.clone(),
            url: doc.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanToken {
    pub serial_number: Option<SerialNumber>,
    pub hash: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPlan {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub collection_name: String,
    pub environment: PlanEnvironment,
    pub factory: PlanDocument,
    pub default_token: Option<PlanDocument>,
    pub tokens: Vec<PlanToken>,
    pub media: UrlMap,
    /// Number of diagnostics recorded during the run
    pub diagnostics: usize,
}

impl UploadPlan {
    pub fn assemble(
        config: &RunConfig,
        collection_name: &str,
        template: TokenUriTemplate,
        published: &PublishedCollection,
        media: UrlMap,
        diagnostics: usize,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            collection_name: collection_name.to_string(),
            environment: PlanEnvironment {
                env: config.environment.clone(),
                url: config.environment_url.clone(),
                token_uri_template: template,
            },
            factory: PlanDocument::from(&published.factory),
            default_token: published.default_token.as_ref().map(PlanDocument::from),
            tokens: published
                .tokens
                .iter()
                .map(|t| PlanToken {
                    serial_number: t.serial_number.clone(),
                    hash: t.document.hash.clone(),
                    url: t.document.url.clone(),
                })
                .collect(),
            media,
            diagnostics,
        }
    }

    /// Write to `{working_dir}/upload.json`, replacing any previous plan
    /// in one rename
    pub async fn write(&self, working_dir: &Path) -> Result<PathBuf> {
        let target = working_dir.join(UPLOAD_PLAN_FILE);
        let staging = working_dir.join(format!("{}.tmp", UPLOAD_PLAN_FILE));

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &target).await?;

        info!(path = %target.display(), run_id = %self.run_id, "Wrote upload plan");
        Ok(target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ResolvedEnvironment;
    use crate::publish::PublishedToken;
    use tempfile::TempDir;

    fn document(hash: &str, name: &str) -> PublishedDocument {
        PublishedDocument {
            hash: hash.to_string(),
            file_name: name.to_string(),
            path: PathBuf::from(name),
            url: format!("https://cdn.example.com/Tacos/{}", name),
        }
    }

    fn plan() -> UploadPlan {
        let config = RunConfig::new(ResolvedEnvironment {
            name: "prod".to_string(),
            url: "https://cdn.example.com".to_string(),
        });
        let published = PublishedCollection {
            factory: document("f0", "f0"),
            default_token: None,
            tokens: vec![PublishedToken {
                serial_number: Some(SerialNumber::from(7)),
                document: document("t7", "7"),
            }],
        };
        let mut media = UrlMap::new();
        media.insert("generated_media/b.png", "https://cdn.example.com/Tacos/b.png");
        media.insert("generated_media/a.png", "https://cdn.example.com/Tacos/a.png");

        UploadPlan::assemble(&config, "Tacos", TokenUriTemplate::SerialNumber, &published, media, 2)
    }

    #[test]
    fn test_plan_json_shape() {
        let value = serde_json::to_value(plan()).unwrap();

        assert!(value["runId"].is_string());
        assert!(value["generatedAt"].is_string());
        assert_eq!(value["collectionName"], "Tacos");
        assert_eq!(value["environment"]["env"], "prod");
        assert_eq!(value["environment"]["tokenUriTemplate"], "{serial_number}");
        assert_eq!(value["factory"]["hash"], "f0");
        assert!(value["defaultToken"].is_null());
        assert_eq!(value["tokens"][0]["serialNumber"], 7);
        assert_eq!(value["tokens"][0]["url"], "https://cdn.example.com/Tacos/7");
        assert_eq!(value["diagnostics"], 2);
    }

    #[test]
    fn test_media_sorted_by_staged_path() {
        let json = serde_json::to_string(&plan()).unwrap();
        let a = json.find("generated_media/a.png").unwrap();
        let b = json.find("generated_media/b.png").unwrap();
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_plan() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(UPLOAD_PLAN_FILE), "stale").unwrap();

        let plan = plan();
        let path = plan.write(dir.path()).await.unwrap();

        let written: UploadPlan =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, plan);
        assert!(!dir.path().join("upload.json.tmp").exists());
    }
}
