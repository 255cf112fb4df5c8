//! Core traits for swingby collaborators.
//!
//! These traits define the seams between the reconciliation/indexing engine
//! and the failure-prone outside world, enabling pluggable backends and
//! deterministic tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Answer, ErrorAnalysis, PartialRecord, ReferenceStub};

// =============================================================================
// BIBLIOGRAPHIC SOURCE
// =============================================================================

/// One external bibliographic provider.
///
/// Implementations return `Ok(None)` for "no match" and `Err` for transient
/// provider failures; the reconciler converts errors to null results, so a
/// broken provider never aborts a reconciliation pass.
#[async_trait]
pub trait BibliographicSource: Send + Sync {
    /// Stable identifier used in logs, fallback routing, and harvested
    /// identifier maps ("arxiv", "crossref", "ads").
    fn id(&self) -> &str;

    /// Primary lookup by title, optionally narrowed by author.
    async fn lookup_by_title(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<PartialRecord>>;

    /// Lookup by this provider's own identifier, or by DOI (every provider
    /// here resolves DOIs).
    async fn lookup_by_identifier(&self, id: &str) -> Result<Option<PartialRecord>>;

    /// Lookup using another provider's identifier (e.g. ADS resolving an
    /// arXiv id). Providers without cross-identifier support return
    /// `Ok(None)`.
    async fn lookup_by_cross_identifier(
        &self,
        source_id: &str,
        id: &str,
    ) -> Result<Option<PartialRecord>> {
        let _ = (source_id, id);
        Ok(None)
    }
}

// =============================================================================
// LANGUAGE-MODEL SERVICE
// =============================================================================

/// The embedding/completion collaborator.
///
/// One implementation per deployment; tests use the deterministic mock in
/// `swingby-inference`.
#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Embed a batch of texts. Output vectors all share one dimensionality.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Extract up to `n` ordered keywords; the first acts as a category,
    /// `ratio` controls the general/specific split. `examples` are
    /// "title: keywords" lines from related entries, when available.
    async fn extract_keywords(
        &self,
        text: &str,
        n: usize,
        ratio: f32,
        examples: &[String],
    ) -> Result<Vec<String>>;

    /// Extract search keywords from a retrieval question (a different
    /// prompt than document keywords: question words are excluded).
    async fn extract_query_keywords(&self, question: &str) -> Result<Vec<String>>;

    /// Parse a batch of unstructured citation strings into structured
    /// stubs. Best-effort: any field may be missing and the output count
    /// need not match the input count.
    async fn parse_references(&self, unstructured: &[String]) -> Result<Vec<ReferenceStub>>;

    /// Single-sentence summary of a text.
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Root-cause analysis of an error log.
    async fn analyze_error(&self, text: &str) -> Result<ErrorAnalysis>;

    /// Answer a query against assembled context.
    async fn answer(&self, query: &str, context: &str) -> Result<Answer>;
}

// =============================================================================
// DISAMBIGUATION POLICY
// =============================================================================

/// Decides whether a fetched candidate whose title disagrees with the query
/// should be used anyway.
///
/// Injected per run: unattended runs use [`AlwaysReject`] so reconciliation
/// never blocks on input.
pub trait DisambiguationPolicy: Send + Sync {
    /// `true` accepts the fetched candidate, `false` treats the source as
    /// having returned nothing.
    fn confirm(&self, source_id: &str, requested: &str, fetched: &str) -> bool;
}

/// Reject every ambiguous candidate (script mode default).
pub struct AlwaysReject;

impl DisambiguationPolicy for AlwaysReject {
    fn confirm(&self, source_id: &str, requested: &str, fetched: &str) -> bool {
        tracing::warn!(
            source_id,
            requested,
            fetched,
            "Rejecting ambiguous candidate (unattended mode)"
        );
        false
    }
}

/// Accept every ambiguous candidate.
pub struct AlwaysAccept;

impl DisambiguationPolicy for AlwaysAccept {
    fn confirm(&self, source_id: &str, requested: &str, fetched: &str) -> bool {
        tracing::warn!(
            source_id,
            requested,
            fetched,
            "Accepting ambiguous candidate (accept-all policy)"
        );
        true
    }
}

/// Ask the operator on stdin. This is a deliberate synchronous suspension
/// point; do not install it for unattended runs.
pub struct InteractivePrompt;

impl DisambiguationPolicy for InteractivePrompt {
    fn confirm(&self, source_id: &str, requested: &str, fetched: &str) -> bool {
        use std::io::Write;

        eprintln!("WARNING: Fetched paper might not be correct ({source_id})");
        eprintln!("\tRequested:\t{requested}");
        eprintln!("\tFetched:\t{fetched}");
        eprint!("\tDo you want to use the fetched paper? (y/N): ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case("y")
    }
}
