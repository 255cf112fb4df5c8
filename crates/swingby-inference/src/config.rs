//! Inference configuration.
//!
//! Configuration comes from environment variables (a `.env` file is
//! honored via `dotenvy`). The model token is a required credential:
//! its absence is a configuration error surfaced immediately at startup,
//! unlike provider outages which degrade gracefully at runtime.

use std::env;

use tracing::debug;

use swingby_core::defaults::{COMPLETION_MODEL, EMBEDDING_MODEL, INFERENCE_TIMEOUT, MODEL_ENDPOINT};
use swingby_core::{Error, Result};

/// Environment variable holding the API token.
pub const MODEL_TOKEN_VAR: &str = "MODEL_TOKEN";

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model used for embeddings.
    pub embedding_model: String,
    /// Model used for keyword/reference/answer completions.
    pub completion_model: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl InferenceConfig {
    /// Build from the environment, falling back to the shared defaults
    /// for everything except the token.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_key = env::var(MODEL_TOKEN_VAR)
            .map_err(|_| Error::Config(format!("{MODEL_TOKEN_VAR} is not set")))?;

        let config = Self {
            base_url: env::var("MODEL_ENDPOINT").unwrap_or_else(|_| MODEL_ENDPOINT.to_string()),
            api_key,
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| EMBEDDING_MODEL.to_string()),
            completion_model: env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| COMPLETION_MODEL.to_string()),
            timeout_seconds: env::var("INFERENCE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(INFERENCE_TIMEOUT.as_secs()),
        };
        config.validate()?;
        debug!(
            base_url = %config.base_url,
            embedding_model = %config.embedding_model,
            completion_model = %config.completion_model,
            "Loaded inference configuration"
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(format!("{MODEL_TOKEN_VAR} is empty")));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Endpoint must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.embedding_model.is_empty() || self.completion_model.is_empty() {
            return Err(Error::Config("Model names cannot be empty".to_string()));
        }
        Ok(())
    }
}
