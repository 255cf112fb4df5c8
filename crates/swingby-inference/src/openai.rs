//! OpenAI-compatible language-model backend.
//!
//! Embeddings go through `/embeddings`; every completion goes through
//! `/chat/completions` in JSON mode, with the system prompt naming the
//! key(s) parsed out of the reply. Token usage is logged at debug.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use swingby_core::models::{Answer, ErrorAnalysis, ReferenceStub};
use swingby_core::traits::LanguageModelService;
use swingby_core::{Error, Result};

use crate::config::InferenceConfig;
use crate::prompts;

pub struct OpenAiBackend {
    client: Client,
    config: InferenceConfig,
}

impl OpenAiBackend {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(InferenceConfig::from_env()?)
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    /// Run one JSON-mode completion and parse the reply body.
    async fn complete_json(&self, system: String, user: String) -> Result<JsonValue> {
        let request = ChatRequest {
            model: self.config.completion_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(model = %self.config.completion_model, "Sending completion API request");
        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Inference(format!(
                "HTTP {} from completion endpoint",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Malformed response: {e}")))?;
        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Received completion API response"
            );
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Inference("Completion returned no choices".to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Inference(format!("Completion was not valid JSON: {e}")))
    }

    fn string_list(value: &JsonValue, key: &str) -> Result<Vec<String>> {
        value
            .get(key)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .ok_or_else(|| Error::Inference(format!("Completion reply missing \"{key}\" list")))
    }
}

#[async_trait]
impl LanguageModelService for OpenAiBackend {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            input_count = texts.len(),
            model = %self.config.embedding_model,
            "Sending embedding API request"
        );
        let request = EmbeddingRequest {
            model: self.config.embedding_model.clone(),
            input: texts.to_vec(),
        };
        let response = self
            .build_request("/embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Embedding(format!(
                "HTTP {} from embedding endpoint",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Malformed response: {e}")))?;
        if let Some(usage) = &body.usage {
            debug!(prompt_tokens = usage.prompt_tokens, "Received embedding API response");
        }
        if body.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Requested {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn extract_keywords(
        &self,
        text: &str,
        n: usize,
        ratio: f32,
        examples: &[String],
    ) -> Result<Vec<String>> {
        let mut system = prompts::document_keyword_prompt(n, ratio);
        if !examples.is_empty() {
            system.push_str("\nExamples:\n");
            for example in examples {
                system.push_str(example);
                system.push('\n');
            }
        }

        let reply = self.complete_json(system, text.to_string()).await?;
        let keywords = Self::string_list(&reply, "keywords")?;
        if keywords.len() != n {
            // Cosmetic mismatch; the generated list is kept.
            warn!(
                expected = n,
                result_count = keywords.len(),
                "Keyword count differs from requested"
            );
        }
        Ok(keywords)
    }

    async fn extract_query_keywords(&self, question: &str) -> Result<Vec<String>> {
        let reply = self
            .complete_json(
                prompts::QUESTION_KEYWORD_PROMPT.to_string(),
                question.to_string(),
            )
            .await?;
        Self::string_list(&reply, "keywords")
    }

    async fn parse_references(&self, unstructured: &[String]) -> Result<Vec<ReferenceStub>> {
        if unstructured.is_empty() {
            return Ok(vec![]);
        }

        debug!(ref_count = unstructured.len(), "Parsing unstructured references");
        let reply = self
            .complete_json(
                prompts::REFERENCE_PARSE_PROMPT.to_string(),
                unstructured.join("\n"),
            )
            .await?;

        let entries = reply
            .get("references")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| {
                Error::Inference("Completion reply missing \"references\" list".to_string())
            })?;
        Ok(entries.iter().map(parse_stub).collect())
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let reply = self
            .complete_json(prompts::SUMMARIZE_PROMPT.to_string(), text.to_string())
            .await?;
        reply
            .get("summary")
            .and_then(JsonValue::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::Inference("Completion reply missing \"summary\"".to_string()))
    }

    async fn analyze_error(&self, text: &str) -> Result<ErrorAnalysis> {
        let reply = self
            .complete_json(prompts::ERROR_ANALYSIS_PROMPT.to_string(), text.to_string())
            .await?;
        serde_json::from_value(reply)
            .map_err(|e| Error::Inference(format!("Malformed error analysis: {e}")))
    }

    async fn answer(&self, query: &str, context: &str) -> Result<Answer> {
        let user = format!("## Reference documents\n{context}\n\n## Question\n{query}");
        let reply = self
            .complete_json(prompts::QNA_PROMPT.to_string(), user)
            .await?;

        let answer = reply
            .get("answer")
            .and_then(JsonValue::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::Inference("Completion reply missing \"answer\"".to_string()))?;
        let references = Self::string_list(&reply, "references").unwrap_or_default();
        Ok(Answer { answer, references })
    }
}

/// Lenient stub extraction: the parser model sometimes emits years as
/// strings and omits fields entirely.
fn parse_stub(value: &JsonValue) -> ReferenceStub {
    let year = match value.get("year") {
        Some(JsonValue::Number(n)) => n.as_i64().map(|y| y as i32),
        Some(JsonValue::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    ReferenceStub {
        title: value
            .get("title")
            .and_then(JsonValue::as_str)
            .map(str::to_owned),
        first_author: value
            .get("first_author")
            .and_then(JsonValue::as_str)
            .map(str::to_owned),
        year,
        doi: None,
        identifier: None,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
