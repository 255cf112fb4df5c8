//! First-writer-wins merge of partial lookup results.
//!
//! A field, once populated by a higher-priority source, is never
//! overwritten by a lower-priority one; later sources only fill nulls.
//! This is the opposite of the knowledge store's `append`, where a reindex
//! is an authoritative full replace.

use swingby_core::models::{ArticleRecord, PartialRecord};

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Merge one source's partial result into the accumulator.
///
/// `source_id` tags the harvested provider identifier so fallback
/// re-queries know which provider it belongs to. References count as one
/// field: the first source to return a non-empty list populates them.
pub fn merge_partial(record: &mut ArticleRecord, source_id: &str, partial: PartialRecord) {
    fill(&mut record.title, partial.title);
    fill(&mut record.first_author, partial.first_author);
    fill(&mut record.year, partial.year);
    fill(&mut record.doi, partial.doi);
    fill(&mut record.summary, partial.abstract_text);

    if let Some(identifier) = partial.identifier {
        record
            .identifiers
            .entry(source_id.to_string())
            .or_insert(identifier);
    }

    if record.references.is_empty() && !partial.references.is_empty() {
        record.references = partial.references;
    }
}
