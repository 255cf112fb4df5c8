//! # swingby-engine
//!
//! The indexing and retrieval engine: corpus documents (Markdown with YAML
//! front matter), the incremental indexer with its content-hash guard and
//! per-kind enrichment, and the hybrid retrieval orchestrator that
//! assembles bounded context for question answering.

pub mod base;
pub mod config;
pub mod document;
pub mod indexer;
pub mod retrieval;

pub use base::KnowledgeBase;
pub use config::EngineConfig;
pub use document::Document;
pub use indexer::{IndexOutcome, IndexReport, Indexer};
pub use retrieval::{RetrievalOrchestrator, RetrievalOutcome};
