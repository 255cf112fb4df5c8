//! Hybrid retrieval and answer generation.
//!
//! A query fans out to a vector search per embedding field present in the
//! store plus one keyword-overlap search, the hits are unioned and
//! deduplicated by key, and the selected entries' full texts are packed
//! into a budget-bounded context for the answer collaborator.
//!
//! There is no unified score across the vector and keyword result sets:
//! selection order is vector hits per field (fields in name order), then
//! keyword hits, deduplicated keeping the most recently seen row. Nothing
//! beyond that ordering is guaranteed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use swingby_core::models::{Answer, KnowledgeEntry};
use swingby_core::tokenizer::estimate_tokens;
use swingby_core::traits::LanguageModelService;
use swingby_core::{Error, Result};
use swingby_store::KnowledgeStore;

use crate::config::EngineConfig;

/// Answer plus the keys whose text made it into the context.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutcome {
    pub answer: Answer,
    pub context_keys: Vec<String>,
}

pub struct RetrievalOrchestrator {
    store: Arc<RwLock<KnowledgeStore>>,
    llm: Arc<dyn LanguageModelService>,
    config: EngineConfig,
    /// Full-text cache, per process run.
    text_cache: Mutex<HashMap<String, String>>,
}

impl RetrievalOrchestrator {
    pub fn new(
        store: Arc<RwLock<KnowledgeStore>>,
        llm: Arc<dyn LanguageModelService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            llm,
            config,
            text_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Answer a question against the knowledge store.
    pub async fn qna(&self, query: &str) -> Result<RetrievalOutcome> {
        info!(query, op = "qna", "Answering query");

        let selected = self.search(query).await?;
        let (context, context_keys) = self.assemble_context(&selected).await;

        let answer = self.llm.answer(query, &context).await?;
        info!(
            result_count = context_keys.len(),
            op = "qna",
            "Answer generated"
        );
        Ok(RetrievalOutcome {
            answer,
            context_keys,
        })
    }

    /// Hybrid candidate selection: vector hits per stored embedding field,
    /// then keyword hits, deduplicated by key keeping the most recently
    /// seen row.
    pub async fn search(&self, query: &str) -> Result<Vec<KnowledgeEntry>> {
        let query_vectors = self.llm.embed(&[query.to_string()]).await?;
        let query_vector = query_vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding for query".to_string()))?;
        let query_keywords = self.llm.extract_query_keywords(query).await?;

        let store = self.store.read().await;
        let mut candidates: Vec<KnowledgeEntry> = Vec::new();
        for field in store.embedding_fields() {
            for hit in store.vector_search(&field, &query_vector, self.config.vector_fanout) {
                candidates.push(hit.clone());
            }
        }
        for hit in store.keyword_search(&query_keywords, self.config.keyword_fanout) {
            candidates.push(hit.clone());
        }
        drop(store);

        let mut position: HashMap<String, usize> = HashMap::new();
        let mut selected: Vec<KnowledgeEntry> = Vec::new();
        for entry in candidates {
            match position.get(&entry.key) {
                Some(&i) => selected[i] = entry,
                None => {
                    position.insert(entry.key.clone(), selected.len());
                    selected.push(entry);
                }
            }
        }

        debug!(
            query,
            result_count = selected.len(),
            op = "search",
            "Hybrid selection complete"
        );
        Ok(selected)
    }

    /// Pack selected entries into a context buffer under the token
    /// budget. Entries are taken in retrieval order; the first entry that
    /// would push the estimate past the budget stops the packing —
    /// skipped, never truncated.
    async fn assemble_context(&self, selected: &[KnowledgeEntry]) -> (String, Vec<String>) {
        let mut context = String::new();
        let mut keys = Vec::new();
        let mut spent = 0usize;

        for entry in selected {
            let Some(text) = self.full_text(entry).await else {
                continue;
            };
            let block = format!(
                "### {}\n{}\n\n",
                entry.title.as_deref().unwrap_or(&entry.key),
                text
            );
            let cost = estimate_tokens(&block);
            if spent + cost > self.config.context_budget {
                debug!(
                    key = %entry.key,
                    token_count = cost,
                    skipped = true,
                    "Context budget reached"
                );
                break;
            }
            spent += cost;
            context.push_str(&block);
            keys.push(entry.key.clone());
        }

        debug!(token_count = spent, result_count = keys.len(), "Context assembled");
        (context, keys)
    }

    /// Load an entry's source file lazily, cached for the process run. A
    /// missing file is logged and the entry skipped.
    async fn full_text(&self, entry: &KnowledgeEntry) -> Option<String> {
        let mut cache = self.text_cache.lock().await;
        if let Some(text) = cache.get(&entry.key) {
            return Some(text.clone());
        }
        let path = self.config.corpus_dir.join(&entry.file_name);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                cache.insert(entry.key.clone(), text.clone());
                Some(text)
            }
            Err(e) => {
                warn!(
                    key = %entry.key,
                    file_name = %path.display(),
                    error = %e,
                    "Could not load entry text; excluded from context"
                );
                None
            }
        }
    }
}
