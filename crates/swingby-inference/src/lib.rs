//! # swingby-inference
//!
//! The language-model service behind the [`LanguageModelService`] trait:
//! an OpenAI-compatible HTTP backend for embeddings and JSON-mode
//! completions, the prompt set, env-driven configuration, and a
//! deterministic mock for tests.
//!
//! [`LanguageModelService`]: swingby_core::traits::LanguageModelService

pub mod config;
pub mod mock;
pub mod openai;
pub mod prompts;

pub use config::InferenceConfig;
pub use mock::MockLanguageModel;
pub use openai::OpenAiBackend;
