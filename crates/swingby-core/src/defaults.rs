//! Default tuning values shared across swingby crates.
//!
//! Collected in one place so the engine, store, and inference crates agree
//! without circular imports.

use std::time::Duration;

/// Keywords requested per document.
pub const KEYWORD_COUNT: usize = 10;

/// Ratio of general to specific keywords.
pub const KEYWORD_RATIO: f32 = 0.4;

/// Results fetched per embedding field during retrieval.
pub const VECTOR_FANOUT: usize = 5;

/// Results fetched by keyword overlap during retrieval.
pub const KEYWORD_FANOUT: usize = 5;

/// Nearest stored entries sampled per embedding field when building
/// keyword few-shot examples.
pub const KEYWORD_EXAMPLE_NEIGHBORS: usize = 3;

/// Estimated token budget for an assembled answer context.
pub const CONTEXT_TOKEN_BUDGET: usize = 6000;

/// Per-call timeout for bibliographic source requests.
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call timeout for language-model requests.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default OpenAI-compatible endpoint.
pub const MODEL_ENDPOINT: &str = "https://models.inference.ai.azure.com";

/// Default embedding model.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default completion model for keywords, reference parsing, and answers.
pub const COMPLETION_MODEL: &str = "gpt-4o-mini";
