//! The knowledge base facade: one object wiring store, reconciler,
//! resolver, indexer, and retrieval together with injected collaborators.
//!
//! No process-wide singletons: the source set and the language-model
//! service are passed in, and the disambiguation policy follows the
//! configured mode (unattended runs auto-reject, attended runs prompt).

use std::sync::Arc;

use tokio::sync::RwLock;

use swingby_core::traits::{
    AlwaysReject, BibliographicSource, DisambiguationPolicy, InteractivePrompt,
    LanguageModelService,
};
use swingby_core::Result;
use swingby_sources::{Reconciler, ReferenceResolver};
use swingby_store::KnowledgeStore;

use crate::config::EngineConfig;
use crate::indexer::{IndexReport, Indexer};
use crate::retrieval::{RetrievalOrchestrator, RetrievalOutcome};

pub struct KnowledgeBase {
    store: Arc<RwLock<KnowledgeStore>>,
    indexer: Indexer,
    retrieval: RetrievalOrchestrator,
}

impl KnowledgeBase {
    /// Wire a knowledge base from its collaborators. The disambiguation
    /// policy follows `config.script_mode`.
    pub fn new(
        config: EngineConfig,
        sources: Vec<Arc<dyn BibliographicSource>>,
        llm: Arc<dyn LanguageModelService>,
    ) -> Self {
        let policy: Arc<dyn DisambiguationPolicy> = if config.script_mode {
            Arc::new(AlwaysReject)
        } else {
            Arc::new(InteractivePrompt)
        };
        Self::with_policy(config, sources, llm, policy)
    }

    /// Wire a knowledge base with an explicit disambiguation policy.
    pub fn with_policy(
        config: EngineConfig,
        sources: Vec<Arc<dyn BibliographicSource>>,
        llm: Arc<dyn LanguageModelService>,
        policy: Arc<dyn DisambiguationPolicy>,
    ) -> Self {
        let store = Arc::new(RwLock::new(KnowledgeStore::load(&config.store_path)));
        let reconciler = Arc::new(Reconciler::new(sources, policy));
        let resolver = Arc::new(ReferenceResolver::new(reconciler.clone(), llm.clone()));

        let indexer = Indexer::new(
            store.clone(),
            llm.clone(),
            reconciler,
            resolver,
            config.clone(),
        );
        let retrieval = RetrievalOrchestrator::new(store.clone(), llm, config);

        Self {
            store,
            indexer,
            retrieval,
        }
    }

    /// Index new and changed corpus files, rebuild citations, save.
    pub async fn process_updated_files(&self) -> Result<IndexReport> {
        self.indexer.index_corpus().await
    }

    /// Answer a question against the indexed corpus.
    pub async fn qna(&self, query: &str) -> Result<RetrievalOutcome> {
        self.retrieval.qna(query).await
    }

    /// Shared handle to the underlying store (single-writer: all mutation
    /// goes through the lock).
    pub fn store(&self) -> Arc<RwLock<KnowledgeStore>> {
        self.store.clone()
    }
}
