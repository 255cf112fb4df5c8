//! Incremental corpus indexing.
//!
//! Each Markdown file becomes one knowledge-store row. A stored content
//! hash guards re-indexing: an unchanged file is skipped before any
//! collaborator (source, embedding, keyword) is called, and its row is
//! left untouched. A changed file re-runs the full enrichment for its
//! kind and overwrites the row by key. One bad document never aborts the
//! batch.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use swingby_core::models::{DocumentKind, KnowledgeEntry};
use swingby_core::sbkey::generate_sbkey;
use swingby_core::traits::LanguageModelService;
use swingby_core::{defaults, Result};
use swingby_sources::{Reconciler, ReferenceResolver};
use swingby_store::KnowledgeStore;

use crate::config::EngineConfig;
use crate::document::{extract_section, Document};

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Freshly indexed or re-indexed; carries the row key.
    Indexed(String),
    /// Content hash matched the stored row; nothing was done.
    Unchanged(String),
}

/// Batch summary for one corpus pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

pub struct Indexer {
    store: Arc<RwLock<KnowledgeStore>>,
    llm: Arc<dyn LanguageModelService>,
    reconciler: Arc<Reconciler>,
    resolver: Arc<ReferenceResolver>,
    config: EngineConfig,
}

impl Indexer {
    pub fn new(
        store: Arc<RwLock<KnowledgeStore>>,
        llm: Arc<dyn LanguageModelService>,
        reconciler: Arc<Reconciler>,
        resolver: Arc<ReferenceResolver>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            llm,
            reconciler,
            resolver,
            config,
        }
    }

    /// Index every `*.md` file under the corpus directory, then rebuild
    /// citation back-links and save the store.
    pub async fn index_corpus(&self) -> Result<IndexReport> {
        let mut files: Vec<_> = walkdir::WalkDir::new(&self.config.corpus_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map(|ext| ext == "md").unwrap_or(false))
            .collect();
        files.sort();

        info!(
            result_count = files.len(),
            corpus = %self.config.corpus_dir.display(),
            op = "index_corpus",
            "Starting corpus pass"
        );

        let mut report = IndexReport::default();
        for path in files {
            match self.index_file(&path).await {
                Ok(IndexOutcome::Indexed(key)) => {
                    debug!(key = %key, file_name = %path.display(), "Indexed");
                    report.indexed += 1;
                }
                Ok(IndexOutcome::Unchanged(key)) => {
                    debug!(key = %key, file_name = %path.display(), skipped = true, "Unchanged");
                    report.unchanged += 1;
                }
                Err(e) => {
                    warn!(file_name = %path.display(), error = %e, "Failed to index file");
                    report.failed += 1;
                }
            }
        }

        {
            let mut store = self.store.write().await;
            store.rebuild_citations();
            store.save()?;
        }

        info!(
            indexed = report.indexed,
            unchanged = report.unchanged,
            failed = report.failed,
            op = "index_corpus",
            "Corpus pass complete"
        );
        Ok(report)
    }

    /// Index a single file. The caller is responsible for saving the
    /// store afterwards; `index_corpus` does both.
    pub async fn index_file(&self, path: &Path) -> Result<IndexOutcome> {
        let doc = Document::read(path)?;

        // Hash guard: unchanged content skips reconciliation, embedding,
        // and keyword generation entirely.
        {
            let store = self.store.read().await;
            if let Some(existing) = store.get_by_file(&doc.file_name) {
                if existing.content_hash == doc.content_hash {
                    return Ok(IndexOutcome::Unchanged(existing.key.clone()));
                }
            }
        }

        let entry = match doc.kind {
            DocumentKind::Note => self.enrich_note(&doc).await?,
            DocumentKind::Article => self.enrich_article(&doc).await?,
            DocumentKind::DebugLog => self.enrich_debug(&doc).await?,
        };

        let key = entry.key.clone();
        self.store.write().await.append(entry);
        Ok(IndexOutcome::Indexed(key))
    }

    async fn enrich_note(&self, doc: &Document) -> Result<KnowledgeEntry> {
        let title = doc.title().to_string();
        let embeddings = self
            .embed_fields(&[("title", title.clone()), ("body", doc.body.clone())])
            .await?;

        let payload = format!("title: {title}\nbody:\n{}\n", doc.body);
        let keywords = self.keywords(&payload, &embeddings).await?;

        Ok(KnowledgeEntry {
            key: doc.front_matter.key.clone().unwrap_or_else(|| doc.stem.clone()),
            content_hash: doc.content_hash.clone(),
            file_name: doc.file_name.clone(),
            kind: DocumentKind::Note,
            indexed_at: Some(Utc::now()),
            keywords,
            embeddings,
            title: Some(title),
            author: doc.front_matter.author.clone(),
            year: doc.front_matter.year,
            doi: doc.front_matter.doi.clone(),
            ..Default::default()
        })
    }

    async fn enrich_article(&self, doc: &Document) -> Result<KnowledgeEntry> {
        let seed_title = doc.title().to_string();
        let record = self
            .reconciler
            .reconcile(&seed_title, doc.front_matter.first_author())
            .await;

        let title = record.title.clone().unwrap_or(seed_title);
        let year = record.year.or(doc.front_matter.year);
        let doi = record.doi.clone().or_else(|| doc.front_matter.doi.clone());
        let key = generate_sbkey(&title, record.first_author.as_deref(), year);

        let refs = self.resolver.resolve(&record.references).await;

        let mut fields = vec![("title", title.clone()), ("body", doc.body.clone())];
        if let Some(summary) = &record.summary {
            fields.push(("summary", summary.clone()));
        }
        let embeddings = self.embed_fields(&fields).await?;

        let mut payload = format!("title: {title}\n");
        if let Some(summary) = &record.summary {
            payload.push_str(&format!("summary:\n{summary}\n"));
        }
        payload.push_str(&format!("body:\n{}\n", doc.body));
        let keywords = self.keywords(&payload, &embeddings).await?;

        Ok(KnowledgeEntry {
            key,
            content_hash: doc.content_hash.clone(),
            file_name: doc.file_name.clone(),
            kind: DocumentKind::Article,
            indexed_at: Some(Utc::now()),
            keywords,
            embeddings,
            title: Some(title),
            author: doc.front_matter.author.clone(),
            year,
            doi,
            refs,
            ..Default::default()
        })
    }

    async fn enrich_debug(&self, doc: &Document) -> Result<KnowledgeEntry> {
        let issue = extract_section(&doc.body, "Issue").unwrap_or_else(|| doc.body.clone());
        let analysis = self.llm.analyze_error(&issue).await?;

        let embeddings = self
            .embed_fields(&[
                ("error_message", analysis.error_message.clone()),
                ("error_traceback", analysis.traceback.clone()),
            ])
            .await?;

        let mut payload = String::from("## Core Error:\n");
        payload.push_str(&format!("error_message: {}\n", analysis.error_message));
        payload.push_str(&format!("error_location: {}\n", analysis.location));
        payload.push_str(&format!("error_traceback:\n```\n{}\n```\n", analysis.traceback));
        if let Some(process) = extract_section(&doc.body, "Debug Process") {
            payload.push_str(&format!("\n## Debug Process:\n{process}\n"));
        }
        if let Some(solution) = extract_section(&doc.body, "Solution") {
            payload.push_str(&format!("\n## Solution:\n{solution}\n"));
        }
        let keywords = self.keywords(&payload, &embeddings).await?;

        Ok(KnowledgeEntry {
            key: doc.front_matter.key.clone().unwrap_or_else(|| doc.stem.clone()),
            content_hash: doc.content_hash.clone(),
            file_name: doc.file_name.clone(),
            kind: DocumentKind::DebugLog,
            indexed_at: Some(Utc::now()),
            keywords,
            embeddings,
            title: Some(doc.title().to_string()),
            ..Default::default()
        })
    }

    /// Embed the non-empty fields in one batch, preserving field order.
    async fn embed_fields(
        &self,
        fields: &[(&str, String)],
    ) -> Result<BTreeMap<String, Vec<f32>>> {
        let present: Vec<&(&str, String)> =
            fields.iter().filter(|(_, text)| !text.is_empty()).collect();
        let texts: Vec<String> = present.iter().map(|(_, text)| text.clone()).collect();
        let vectors = self.llm.embed(&texts).await?;

        Ok(present
            .iter()
            .map(|(name, _)| name.to_string())
            .zip(vectors)
            .collect())
    }

    /// Generate keywords, with "title: keywords" few-shot examples drawn
    /// from the nearest stored entries per embedding field.
    async fn keywords(
        &self,
        payload: &str,
        embeddings: &BTreeMap<String, Vec<f32>>,
    ) -> Result<Vec<String>> {
        let examples = self.keyword_examples(embeddings).await;
        self.llm
            .extract_keywords(
                payload,
                self.config.keyword_count,
                self.config.keyword_ratio,
                &examples,
            )
            .await
    }

    async fn keyword_examples(&self, embeddings: &BTreeMap<String, Vec<f32>>) -> Vec<String> {
        let store = self.store.read().await;
        let mut examples: Vec<String> = Vec::new();
        for (field, vector) in embeddings {
            for hit in store.vector_search(field, vector, defaults::KEYWORD_EXAMPLE_NEIGHBORS) {
                if hit.keywords.is_empty() {
                    continue;
                }
                let label = hit.title.as_deref().unwrap_or(&hit.key);
                let example = format!("'{label}': {}", hit.keywords.join(", "));
                if !examples.contains(&example) {
                    examples.push(example);
                }
            }
        }
        examples
    }
}
