//! Core data models for swingby.
//!
//! These types are shared across all swingby crates and represent the
//! reconciled-article and knowledge-entry domain entities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// BIBLIOGRAPHIC RECORD TYPES
// =============================================================================

/// A provider-specific identifier (e.g. an arXiv id or an ADS bibcode),
/// tagged with the source it belongs to so fallback lookups know where to
/// send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIdentifier {
    pub source_id: String,
    pub value: String,
}

impl SourceIdentifier {
    pub fn new(source_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            value: value.into(),
        }
    }
}

/// A structured reference stub: the three fields needed for key generation
/// plus any identifiers that allow a reduced reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStub {
    pub title: Option<String>,
    pub first_author: Option<String>,
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<SourceIdentifier>,
}

impl ReferenceStub {
    /// True when all three key-generation fields are present.
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.first_author.is_some() && self.year.is_some()
    }
}

/// One outgoing reference as returned by a bibliographic source: either an
/// already-structured stub or an opaque citation string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawReference {
    Structured(ReferenceStub),
    Unstructured(String),
}

/// The partial view one bibliographic source returns for one lookup.
///
/// Every field is optional; the reconciler merges these first-writer-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    pub title: Option<String>,
    pub first_author: Option<String>,
    pub year: Option<i32>,
    /// Provider-specific identifier (arXiv id, bibcode, ...).
    pub identifier: Option<String>,
    pub doi: Option<String>,
    /// Abstract or summary text, whichever the provider calls it.
    pub abstract_text: Option<String>,
    pub references: Vec<RawReference>,
}

/// The reconciled view of one article after querying all sources.
///
/// Invariant: each field is populated by the first source (in priority
/// order) that returned it; later sources only fill remaining gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: Option<String>,
    pub first_author: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    /// Provider-specific identifiers harvested along the way, keyed by
    /// source id. These drive the fallback re-queries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<String, String>,
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<RawReference>,
}

impl ArticleRecord {
    /// Seed a record from caller-supplied fields before reconciliation.
    pub fn seed(title: Option<&str>, first_author: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_owned),
            first_author: first_author.map(str::to_owned),
            ..Default::default()
        }
    }

    /// The identifier this record holds for the given source, if any.
    pub fn identifier_for(&self, source_id: &str) -> Option<&str> {
        self.identifiers.get(source_id).map(String::as_str)
    }
}

// =============================================================================
// KNOWLEDGE ENTRY TYPES
// =============================================================================

/// The kind of a corpus document, dispatched on during enrichment instead
/// of a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Note,
    Article,
    DebugLog,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Article => write!(f, "article"),
            Self::DebugLog => write!(f, "debug_log"),
        }
    }
}

/// One persisted row of the knowledge store.
///
/// `key` is the SBKey for articles and the file stem for other notes; it is
/// the sole join/dedup key across the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub key: String,
    pub content_hash: String,
    pub file_name: String,
    #[serde(default)]
    pub kind: DocumentKind,
    /// When this row was last (re)built. Untouched by the hash-guard
    /// skip path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
    /// Ordered keywords; the first element is the category.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Embedding vectors keyed by field name ("title", "body", "summary",
    /// ...). A row may carry any subset of fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub embeddings: BTreeMap<String, Vec<f32>>,

    // Article-specific fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// Resolved outgoing reference keys. A key with no matching entry means
    /// "undiscovered", not an error.
    #[serde(default, rename = "ref", skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cited_by: Vec<String>,
}

impl KnowledgeEntry {
    /// The category keyword, when keywords were generated.
    pub fn category(&self) -> Option<&str> {
        self.keywords.first().map(String::as_str)
    }

    /// The embedding stored under `field`, if present.
    pub fn embedding(&self, field: &str) -> Option<&[f32]> {
        self.embeddings.get(field).map(Vec::as_slice)
    }
}

// =============================================================================
// LANGUAGE-MODEL SERVICE TYPES
// =============================================================================

/// Structured answer from the answer-generation collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// Titles of context documents the answer cites.
    #[serde(default)]
    pub references: Vec<String>,
}

/// Structured output of the error-log analysis used for debug notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    pub error_message: String,
    pub location: String,
    pub traceback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_stub_completeness() {
        let mut stub = ReferenceStub {
            title: Some("A Title".into()),
            first_author: Some("Author, A.".into()),
            year: None,
            ..Default::default()
        };
        assert!(!stub.is_complete());
        stub.year = Some(2020);
        assert!(stub.is_complete());
    }

    #[test]
    fn test_article_record_seed_keeps_caller_fields() {
        let record = ArticleRecord::seed(Some("Some Title"), Some("Smith, J."));
        assert_eq!(record.title.as_deref(), Some("Some Title"));
        assert_eq!(record.first_author.as_deref(), Some("Smith, J."));
        assert!(record.doi.is_none());
        assert!(record.references.is_empty());
    }

    #[test]
    fn test_entry_category_is_first_keyword() {
        let entry = KnowledgeEntry {
            keywords: vec!["astrophysics".into(), "gravity".into()],
            ..Default::default()
        };
        assert_eq!(entry.category(), Some("astrophysics"));
    }

    #[test]
    fn test_entry_serde_uses_ref_field_name() {
        let entry = KnowledgeEntry {
            key: "k".into(),
            refs: vec!["other.".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("ref").is_some());
        assert!(json.get("refs").is_none());
    }

    #[test]
    fn test_raw_reference_roundtrip() {
        let raw = RawReference::Unstructured("Smith J., 2020, Some Paper".into());
        let json = serde_json::to_string(&raw).unwrap();
        let back: RawReference = serde_json::from_str(&json).unwrap();
        assert_eq!(raw, back);
    }
}
