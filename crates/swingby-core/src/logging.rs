//! Structured logging schema and field name constants for swingby.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log queries work identically across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, indexing/retrieval completions |
//! | DEBUG | Decision points, intermediate values, query payloads |
//! | TRACE | Per-item iteration (store rows, reference entries) |

use tracing_subscriber::EnvFilter;

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "sources", "inference", "store", "engine"
pub const SUBSYSTEM: &str = "subsystem";

/// Bibliographic source identifier ("arxiv", "crossref", "ads").
pub const SOURCE_ID: &str = "source_id";

/// Logical operation name.
/// Examples: "reconcile", "resolve_references", "vector_search", "qna"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// SBKey of the entry being operated on.
pub const KEY: &str = "key";

/// Source file of the entry being indexed.
pub const FILE_NAME: &str = "file_name";

/// Title used for a lookup or a merge.
pub const TITLE: &str = "title";

/// Retrieval query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of results returned by a search or lookup.
pub const RESULT_COUNT: &str = "result_count";

/// Number of input texts sent to the embedding model.
pub const INPUT_COUNT: &str = "input_count";

/// Number of reference entries processed.
pub const REF_COUNT: &str = "ref_count";

/// Estimated token count of an assembled context.
pub const TOKEN_COUNT: &str = "token_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation degrades or fails.
pub const ERROR_MSG: &str = "error";

/// Entry skipped (hash guard, budget overflow, dropped stub).
pub const SKIPPED: &str = "skipped";

/// Initialize a process-wide tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
