//! Integrity walker
//!
//! Fills in `integrity` for every static resource of a tree. A resource's
//! digest is `hash_string` over the concatenated hex digests of its URIs in
//! order. Resources that already carry integrity, or have no URIs, are left
//! alone. The first unreachable URI abandons its resource and is recorded;
//! sibling resources are unaffected.

use crate::hasher::ContentHasher;
use crate::progress::create_progress_bar;
use futures::stream::{self, StreamExt};
use nftmeta_common::checksum::combine_digests;
use nftmeta_common::types::Integrity;
use nftmeta_common::{Diagnostics, StaticResources};
use tracing::{debug, info, instrument};

/// Counts from one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub hashed: usize,
    /// Already hashed, or nothing to hash
    pub skipped: usize,
    pub failed: usize,
}

pub struct IntegrityWalker<'h> {
    hasher: &'h ContentHasher,
    concurrency: usize,
}

impl<'h> IntegrityWalker<'h> {
    /// Hash up to `concurrency` resources at once (at least one)
    pub fn new(hasher: &'h ContentHasher, concurrency: usize) -> Self {
        Self {
            hasher,
            concurrency: concurrency.max(1),
        }
    }

    /// Combined digest of `uris`, or `None` once one of them fails.
    ///
    /// The failing locator is recorded in `diagnostics`.
    async fn hash_uris(&self, uris: &[String], diagnostics: &mut Diagnostics) -> Option<String> {
        let mut digests = Vec::with_capacity(uris.len());
        for uri in uris {
            digests.push(self.hasher.hash(uri, diagnostics).await?);
        }
        Some(combine_digests(&digests))
    }

    /// Hash every pending static resource of `tree` in place
    #[instrument(skip_all)]
    pub async fn build_hashes<T>(&self, tree: &mut T, diagnostics: &mut Diagnostics) -> WalkSummary
    where
        T: StaticResources + ?Sized,
    {
        let mut summary = WalkSummary::default();

        let pending: Vec<_> = tree
            .static_resources_mut()
            .into_iter()
            .filter(|slot| {
                let skip = slot.resource.is_hashed() || slot.resource.uris.is_empty();
                if skip {
                    summary.skipped += 1;
                }
                !skip
            })
            .collect();

        let pb = create_progress_bar(pending.len() as u64, "Hashing resources");

        // Each resource collects its own diagnostics; they are merged in
        // document order as results come back.
        let mut results = stream::iter(pending.into_iter().map(move |slot| async move {
            let mut local = Diagnostics::new();
            let outcome = self.hash_uris(&slot.resource.uris, &mut local).await;
            (slot, outcome, local)
        }))
        .buffered(self.concurrency);

        while let Some((slot, outcome, local)) = results.next().await {
            diagnostics.append(local);
            match outcome {
                Some(hash) => {
                    debug!(path = %slot.path, hash = %hash, "Hashed resource");
                    slot.resource.integrity = Some(Integrity::sha256(hash));
                    summary.hashed += 1;
                },
                None => summary.failed += 1,
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            hashed = summary.hashed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Integrity walk complete"
        );
        summary
    }
}
