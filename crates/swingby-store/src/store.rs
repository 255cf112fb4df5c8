//! The knowledge table and its search operations.
//!
//! Entries live in insertion order; `append` with an existing key replaces
//! the row in place (last-write-wins — a reindex is an authoritative full
//! replace, unlike the reconciler's first-writer-wins merge). The store is
//! process-local and not safe for concurrent writers; the engine serializes
//! all mutation behind a single-writer lock.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use swingby_core::models::KnowledgeEntry;
use swingby_core::{Error, Result};

/// On-disk shape: one logical table named `knowledge`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    knowledge: Vec<KnowledgeEntry>,
}

pub struct KnowledgeStore {
    path: PathBuf,
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeStore {
    /// Load the store from disk.
    ///
    /// A missing file starts a fresh store silently; an unreadable or
    /// corrupt file starts a fresh store with an error logged. Load
    /// failure is never fatal to the host process.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoreFile>(&raw) {
                Ok(file) => {
                    info!(
                        result_count = file.knowledge.len(),
                        path = %path.display(),
                        "Loaded knowledge store"
                    );
                    file.knowledge
                }
                Err(e) => {
                    error!(
                        error = %e,
                        path = %path.display(),
                        "Knowledge store is corrupt; starting fresh"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No knowledge store yet; starting fresh");
                Vec::new()
            }
            Err(e) => {
                error!(
                    error = %e,
                    path = %path.display(),
                    "Failed to read knowledge store; starting fresh"
                );
                Vec::new()
            }
        };
        Self { path, entries }
    }

    /// Create an empty store that will save to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Persist the whole table.
    ///
    /// Serializes to a sibling temp file and renames it over the store, so
    /// a crash mid-save leaves the previous file intact.
    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_vec(&StoreFile {
            knowledge: self.entries.clone(),
        })?;

        let tmp = self.temp_path();
        fs::write(&tmp, raw)
            .map_err(|e| Error::Store(format!("Failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Store(format!(
                "Failed to move {} into place: {e}",
                tmp.display()
            ))
        })?;

        info!(
            result_count = self.entries.len(),
            path = %self.path.display(),
            "Saved knowledge store"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "knowledge".to_string());
        name.push_str(".tmp");
        self.path.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    /// Insert or overwrite by key. An overwrite keeps the row's original
    /// insertion position, so keyword-search tie-breaking stays stable
    /// across reindexes.
    pub fn append(&mut self, entry: KnowledgeEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => {
                debug!(key = %entry.key, "Overwriting knowledge entry");
                *slot = entry;
            }
            None => {
                debug!(key = %entry.key, "Appending knowledge entry");
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Row for a source file, for the reindex hash guard (the key of an
    /// article is not known until reconciliation has run).
    pub fn get_by_file(&self, file_name: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    /// Distinct embedding field names present anywhere in the table.
    pub fn embedding_fields(&self) -> Vec<String> {
        let fields: BTreeSet<String> = self
            .entries
            .iter()
            .flat_map(|e| e.embeddings.keys().cloned())
            .collect();
        fields.into_iter().collect()
    }

    /// The `n` entries nearest to `query` by Euclidean distance on the
    /// named embedding field.
    ///
    /// Rows without that field (or with a vector of a different
    /// dimensionality) rank as maximally distant: they can never beat a
    /// row with a real embedding, and the call never fails.
    pub fn vector_search(&self, field: &str, query: &[f32], n: usize) -> Vec<&KnowledgeEntry> {
        let mut scored: Vec<(f32, &KnowledgeEntry)> = self
            .entries
            .iter()
            .map(|entry| (distance(entry.embedding(field), query), entry))
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            field,
            result_count = n.min(scored.len()),
            op = "vector_search",
            "Vector search complete"
        );
        scored.into_iter().take(n).map(|(_, e)| e).collect()
    }

    /// Entries ranked by count of overlapping keywords, zero-overlap rows
    /// filtered out, ties broken by insertion order.
    pub fn keyword_search(&self, query_keywords: &[String], n: usize) -> Vec<&KnowledgeEntry> {
        let mut scored: Vec<(usize, &KnowledgeEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let overlap = entry
                    .keywords
                    .iter()
                    .filter(|k| query_keywords.iter().any(|q| q == *k))
                    .count();
                (overlap > 0).then_some((overlap, entry))
            })
            .collect();
        // Stable sort preserves insertion order among equal counts.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(
            result_count = n.min(scored.len()),
            op = "keyword_search",
            "Keyword search complete"
        );
        scored.into_iter().take(n).map(|(_, e)| e).collect()
    }

    /// Recompute every `cited_by` list from the `ref` lists.
    ///
    /// A reference key with no matching entry is left alone — it means
    /// "undiscovered", and the citation appears once the target gets
    /// indexed and this pass reruns.
    pub fn rebuild_citations(&mut self) {
        let links: Vec<(String, String)> = self
            .entries
            .iter()
            .flat_map(|entry| {
                entry
                    .refs
                    .iter()
                    .map(|target| (target.clone(), entry.key.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for entry in &mut self.entries {
            entry.cited_by.clear();
        }
        for (target, citing) in links {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.key == target) {
                if !entry.cited_by.contains(&citing) {
                    entry.cited_by.push(citing);
                }
            }
        }
    }
}

/// Euclidean distance, or infinity when the row has no comparable vector.
fn distance(stored: Option<&[f32]>, query: &[f32]) -> f32 {
    match stored {
        Some(stored) if stored.len() == query.len() => stored
            .iter()
            .zip(query)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt(),
        _ => f32::INFINITY,
    }
}
