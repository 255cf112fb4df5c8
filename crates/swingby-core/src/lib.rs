//! # swingby-core
//!
//! Core types, traits, and abstractions for the swingby knowledge base.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other swingby crates depend on: the reconciled article model, the
//! SBKey identity scheme, text canonicalization, and the collaborator
//! interfaces for bibliographic sources and the language-model service.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod sbkey;
pub mod tokenizer;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use sbkey::generate_sbkey;
pub use tokenizer::{estimate_tokens, likely_exceeds_limit};
pub use traits::*;
