//! The multi-source article reconciler.
//!
//! Produces the most complete [`ArticleRecord`] obtainable from the
//! configured sources without blocking on any one unreliable provider:
//!
//! 1. one title/author pass over every source, in priority order;
//! 2. first-writer-wins merge of each verified response;
//! 3. a fallback pass that re-queries sources whose required output is
//!    still missing, keyed on identifiers harvested from the others,
//!    stopping at the first success per source.
//!
//! A provider error is logged and treated as a null result; if every
//! source fails, the caller gets back a record holding only the seed
//! fields. Reconciliation itself never fails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use swingby_core::models::{ArticleRecord, PartialRecord, ReferenceStub};
use swingby_core::normalize::is_equivalent;
use swingby_core::traits::{BibliographicSource, DisambiguationPolicy};
use swingby_core::Result;

use crate::merge::merge_partial;

/// An alternative lookup key harvested from an earlier response.
#[derive(Debug, Clone)]
enum FallbackKey {
    /// A DOI; every provider resolves these through `lookup_by_identifier`.
    Doi(String),
    /// Another provider's identifier, routed through
    /// `lookup_by_cross_identifier`.
    Cross(String, String),
}

pub struct Reconciler {
    sources: Vec<Arc<dyn BibliographicSource>>,
    policy: Arc<dyn DisambiguationPolicy>,
}

impl Reconciler {
    /// Sources are queried in the order given; that order defines merge
    /// priority.
    pub fn new(
        sources: Vec<Arc<dyn BibliographicSource>>,
        policy: Arc<dyn DisambiguationPolicy>,
    ) -> Self {
        Self { sources, policy }
    }

    /// Full reconciliation for a document's own identity.
    pub async fn reconcile(&self, title: &str, author: Option<&str>) -> ArticleRecord {
        let mut record = ArticleRecord::seed(Some(title), author);
        debug!(title, op = "reconcile", "Starting reconciliation");

        for source in &self.sources {
            let response = source.lookup_by_title(title, author).await;
            if let Some(partial) = self.verified(source.id(), title, self.guard(source.id(), response))
            {
                merge_partial(&mut record, source.id(), partial);
            }
        }

        self.fill_missing(&mut record).await;

        info!(
            title,
            doi = record.doi.as_deref().unwrap_or("-"),
            ref_count = record.references.len(),
            op = "reconcile",
            "Reconciliation complete"
        );
        record
    }

    /// Reduced reconciliation for a reference stub: by DOI, then by
    /// provider identifier, then by title, stopping as soon as title,
    /// author, and year are all present. References are not fetched.
    ///
    /// The returned record may still be incomplete; the caller keys it
    /// with degraded segments rather than dropping it, unless the title is
    /// missing too.
    pub async fn reconcile_minimal(&self, stub: &ReferenceStub) -> ArticleRecord {
        let mut record = ArticleRecord {
            title: stub.title.clone(),
            first_author: stub.first_author.clone(),
            year: stub.year,
            doi: stub.doi.clone(),
            ..Default::default()
        };
        if let Some(identifier) = &stub.identifier {
            record
                .identifiers
                .insert(identifier.source_id.clone(), identifier.value.clone());
        }
        if is_complete(&record) {
            return record;
        }

        debug!(
            title = record.title.as_deref().unwrap_or("-"),
            op = "reconcile_minimal",
            "Completing reference stub"
        );

        // By DOI.
        if let Some(doi) = record.doi.clone() {
            for source in &self.sources {
                let response = source.lookup_by_identifier(&doi).await;
                self.merge_minimal(&mut record, source.id(), response);
                if is_complete(&record) {
                    return record;
                }
            }
        }

        // By provider identifier. The owning source gets a direct lookup,
        // the others a cross-identifier one.
        if let Some(identifier) = &stub.identifier {
            for source in &self.sources {
                let response = if source.id() == identifier.source_id {
                    source.lookup_by_identifier(&identifier.value).await
                } else {
                    source
                        .lookup_by_cross_identifier(&identifier.source_id, &identifier.value)
                        .await
                };
                self.merge_minimal(&mut record, source.id(), response);
                if is_complete(&record) {
                    return record;
                }
            }
        }

        // By title.
        if let Some(title) = record.title.clone() {
            let author = record.first_author.clone();
            for source in &self.sources {
                let response = source.lookup_by_title(&title, author.as_deref()).await;
                self.merge_minimal(&mut record, source.id(), response);
                if is_complete(&record) {
                    return record;
                }
            }
        }

        record
    }

    /// Fallback pass: each source whose required output (its identifier,
    /// or references while the record has none) is still missing gets
    /// re-queried with keys harvested from the other sources, first
    /// success wins.
    async fn fill_missing(&self, record: &mut ArticleRecord) {
        for source in &self.sources {
            let needs_identifier = record.identifier_for(source.id()).is_none();
            let needs_references = record.references.is_empty();
            if !needs_identifier && !needs_references {
                continue;
            }

            for key in self.alternative_keys(record, source.id()) {
                let response = match &key {
                    FallbackKey::Doi(doi) => source.lookup_by_identifier(doi).await,
                    FallbackKey::Cross(source_id, id) => {
                        source.lookup_by_cross_identifier(source_id, id).await
                    }
                };
                let Some(partial) = self.guard(source.id(), response) else {
                    continue;
                };
                let requested = record.title.clone();
                let Some(partial) = self.verified(
                    source.id(),
                    requested.as_deref().unwrap_or_default(),
                    Some(partial),
                ) else {
                    continue;
                };
                debug!(
                    source_id = source.id(),
                    key = ?key,
                    op = "fill_missing",
                    "Fallback re-query succeeded"
                );
                merge_partial(record, source.id(), partial);
                break;
            }
        }
    }

    /// Keys available for re-querying `for_source`: the merged DOI first,
    /// then the other sources' identifiers in priority order.
    fn alternative_keys(&self, record: &ArticleRecord, for_source: &str) -> Vec<FallbackKey> {
        let mut keys = Vec::new();
        if let Some(doi) = &record.doi {
            keys.push(FallbackKey::Doi(doi.clone()));
        }
        for source in &self.sources {
            if source.id() == for_source {
                continue;
            }
            if let Some(id) = record.identifier_for(source.id()) {
                keys.push(FallbackKey::Cross(source.id().to_string(), id.to_string()));
            }
        }
        keys
    }

    /// Convert a provider error into a null result, logged.
    fn guard(
        &self,
        source_id: &str,
        response: Result<Option<PartialRecord>>,
    ) -> Option<PartialRecord> {
        match response {
            Ok(partial) => partial,
            Err(e) => {
                warn!(source_id, error = %e, "Source lookup failed; treating as no result");
                None
            }
        }
    }

    /// Title verification: an equivalent title passes; anything else goes
    /// through the disambiguation policy, and a rejection counts as the
    /// source having returned nothing.
    fn verified(
        &self,
        source_id: &str,
        requested: &str,
        partial: Option<PartialRecord>,
    ) -> Option<PartialRecord> {
        let partial = partial?;
        let Some(fetched) = partial.title.as_deref() else {
            return Some(partial);
        };
        if requested.is_empty() || is_equivalent(requested, fetched) {
            return Some(partial);
        }
        if self.policy.confirm(source_id, requested, fetched) {
            return Some(partial);
        }
        debug!(source_id, requested, fetched, skipped = true, "Candidate rejected");
        None
    }

    /// Minimal-path merge: no title verification (identifier-keyed lookups
    /// are trusted), references stripped.
    fn merge_minimal(
        &self,
        record: &mut ArticleRecord,
        source_id: &str,
        response: Result<Option<PartialRecord>>,
    ) {
        if let Some(mut partial) = self.guard(source_id, response) {
            partial.references.clear();
            merge_partial(record, source_id, partial);
        }
    }
}

/// Everything key generation wants: title, author, year.
fn is_complete(record: &ArticleRecord) -> bool {
    record.title.is_some() && record.first_author.is_some() && record.year.is_some()
}
