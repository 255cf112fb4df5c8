//! Deterministic mock language-model service for tests.
//!
//! Embeddings are derived from the input text itself, so the same text
//! always produces the same vector. Tests that need controlled distances
//! should pin exact vectors per text with `with_embedding`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use swingby_core::models::{Answer, ErrorAnalysis, ReferenceStub};
use swingby_core::traits::LanguageModelService;
use swingby_core::{Error, Result};

/// One logged call against a [`MockLanguageModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    keywords: Vec<String>,
    query_keywords: Vec<String>,
    parsed_references: Vec<ReferenceStub>,
    summary: String,
    error_analysis: ErrorAnalysis,
    answer: Answer,
    scripted_embeddings: HashMap<String, Vec<f32>>,
    failing_operations: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 16,
            keywords: vec!["category".to_string(), "general".to_string()],
            query_keywords: vec!["category".to_string()],
            parsed_references: Vec::new(),
            summary: "A one-sentence summary.".to_string(),
            error_analysis: ErrorAnalysis::default(),
            answer: Answer {
                answer: "Mock answer".to_string(),
                references: Vec::new(),
            },
            scripted_embeddings: HashMap::new(),
            failing_operations: Vec::new(),
        }
    }
}

/// Mock language-model service with a call log and scripted responses.
#[derive(Clone, Default)]
pub struct MockLanguageModel {
    config: Arc<MockConfig>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the keyword list returned for document keyword extraction.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        Arc::make_mut(&mut self.config).keywords = keywords;
        self
    }

    /// Set the keyword list returned for query keyword extraction.
    pub fn with_query_keywords(mut self, keywords: Vec<String>) -> Self {
        Arc::make_mut(&mut self.config).query_keywords = keywords;
        self
    }

    /// Set the stubs returned by the citation parser.
    pub fn with_parsed_references(mut self, stubs: Vec<ReferenceStub>) -> Self {
        Arc::make_mut(&mut self.config).parsed_references = stubs;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).summary = summary.into();
        self
    }

    pub fn with_error_analysis(mut self, analysis: ErrorAnalysis) -> Self {
        Arc::make_mut(&mut self.config).error_analysis = analysis;
        self
    }

    pub fn with_answer(mut self, answer: Answer) -> Self {
        Arc::make_mut(&mut self.config).answer = answer;
        self
    }

    /// Pin the embedding returned for one exact input text.
    pub fn with_embedding(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Arc::make_mut(&mut self.config)
            .scripted_embeddings
            .insert(text.into(), vector);
        self
    }

    /// Make the named operation fail with an inference error.
    pub fn with_failing_operation(mut self, operation: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_operations
            .push(operation.into());
        self
    }

    /// All calls issued against this mock, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls logged for one operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log(&self, operation: &str, input: &str) -> Result<()> {
        self.calls.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
        });
        if self
            .config
            .failing_operations
            .iter()
            .any(|op| op == operation)
        {
            return Err(Error::Inference(format!("simulated {operation} failure")));
        }
        Ok(())
    }

    /// Deterministic embedding from text content, normalized to unit
    /// length.
    pub fn embedding_for(text: &str, dimension: usize) -> Vec<f32> {
        let mut vector = vec![0.0f32; dimension];
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vector[idx] += 0.1;
        }
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vector.iter_mut().for_each(|x| *x /= magnitude);
        }
        vector
    }
}

#[async_trait]
impl LanguageModelService for MockLanguageModel {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        for text in texts {
            self.log("embed", text)?;
        }
        Ok(texts
            .iter()
            .map(|text| {
                self.config
                    .scripted_embeddings
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| Self::embedding_for(text, self.config.dimension))
            })
            .collect())
    }

    async fn extract_keywords(
        &self,
        text: &str,
        _n: usize,
        _ratio: f32,
        _examples: &[String],
    ) -> Result<Vec<String>> {
        self.log("extract_keywords", text)?;
        Ok(self.config.keywords.clone())
    }

    async fn extract_query_keywords(&self, question: &str) -> Result<Vec<String>> {
        self.log("extract_query_keywords", question)?;
        Ok(self.config.query_keywords.clone())
    }

    async fn parse_references(&self, unstructured: &[String]) -> Result<Vec<ReferenceStub>> {
        self.log("parse_references", &unstructured.join("\n"))?;
        Ok(self.config.parsed_references.clone())
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        self.log("summarize", text)?;
        Ok(self.config.summary.clone())
    }

    async fn analyze_error(&self, text: &str) -> Result<ErrorAnalysis> {
        self.log("analyze_error", text)?;
        Ok(self.config.error_analysis.clone())
    }

    async fn answer(&self, query: &str, _context: &str) -> Result<Answer> {
        self.log("answer", query)?;
        Ok(self.config.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embeddings_are_deterministic() {
        let mock = MockLanguageModel::new();
        let a = mock.embed(&["quantum computing".to_string()]).await.unwrap();
        let b = mock.embed(&["quantum computing".to_string()]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(mock.call_count("embed"), 2);
    }

    #[tokio::test]
    async fn test_scripted_embedding_overrides_derived() {
        let mock = MockLanguageModel::new().with_embedding("pinned", vec![1.0, 0.0]);
        let out = mock.embed(&["pinned".to_string()]).await.unwrap();
        assert_eq!(out[0], vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_failing_operation() {
        let mock = MockLanguageModel::new().with_failing_operation("summarize");
        assert!(mock.summarize("text").await.is_err());
        assert!(mock.embed(&["text".to_string()]).await.is_ok());
    }

    #[test]
    fn test_embedding_for_unit_length() {
        let v = MockLanguageModel::embedding_for("some text", 32);
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.01);
    }
}
