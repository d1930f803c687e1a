//! End-to-end `process` pipeline
//!
//! normalize -> hash -> rewrite -> publish -> plan, all relative to the
//! collection directory.

use crate::config::RunConfig;
use crate::error::Result;
use crate::hasher::ContentHasher;
use crate::integrity::{IntegrityWalker, WalkSummary};
use crate::publish::DocumentPublisher;
use crate::rewrite::UrlRewriter;
use crate::upload::UploadPlan;
use nftmeta_common::Diagnostics;
use nftmeta_ingest::InputFormat;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// What one run produced
#[derive(Debug)]
pub struct ProcessOutcome {
    pub plan: UploadPlan,
    pub plan_path: PathBuf,
    pub walk: WalkSummary,
    pub rewritten: usize,
    pub diagnostics: Diagnostics,
}

#[instrument(skip_all, fields(dir = %dir.display(), env = %config.environment))]
pub async fn process(
    dir: &Path,
    format: Option<InputFormat>,
    config: &RunConfig,
) -> Result<ProcessOutcome> {
    let mut diagnostics = Diagnostics::new();
    let mut collection = nftmeta_ingest::load(dir, format, &mut diagnostics)?;

    let collection_name = config.collection_name_for(&collection).to_string();
    let destinations = config.destinations(&collection);
    let template = collection.factory.token_uri_template();

    let hasher = ContentHasher::new(config.fetch_timeout())?.with_working_dir(dir);
    let walk = IntegrityWalker::new(&hasher, config.max_concurrent_fetches)
        .build_hashes(&mut collection, &mut diagnostics)
        .await;

    let mut rewriter = UrlRewriter::new(&destinations, dir, &config.generated_media_dir);
    let rewritten = rewriter.replace_urls(&mut collection).await?;

    let published = DocumentPublisher::new(dir.join(&config.generated_metadata_dir), &destinations)
        .publish(&collection)
        .await?;

    let plan = UploadPlan::assemble(
        config,
        &collection_name,
        template,
        &published,
        rewriter.into_url_map(),
        diagnostics.len(),
    );
    let plan_path = plan.write(dir).await?;

    info!(
        collection = %collection_name,
        tokens = plan.tokens.len(),
        media = plan.media.len(),
        diagnostics = diagnostics.len(),
        "Pipeline complete"
    );

    Ok(ProcessOutcome {
        plan,
        plan_path,
        walk,
        rewritten,
        diagnostics,
    })
}
