//! Reference resolution: raw outgoing references to SBKeys.
//!
//! Structured stubs go straight to key generation once complete;
//! unstructured citation strings make one batched trip through the
//! language-model citation parser first. Stubs still missing fields after
//! parsing get a reduced reconciliation pass; stubs with no title at the
//! end are dropped, everything else is keyed (degraded segments included).

use std::sync::Arc;

use tracing::{debug, warn};

use swingby_core::models::{RawReference, ReferenceStub};
use swingby_core::sbkey::generate_sbkey;
use swingby_core::traits::LanguageModelService;

use crate::reconciler::Reconciler;

pub struct ReferenceResolver {
    reconciler: Arc<Reconciler>,
    llm: Arc<dyn LanguageModelService>,
}

impl ReferenceResolver {
    pub fn new(reconciler: Arc<Reconciler>, llm: Arc<dyn LanguageModelService>) -> Self {
        Self { reconciler, llm }
    }

    /// Resolve raw references into an ordered list of SBKeys.
    ///
    /// Duplicates are preserved; the knowledge store dedups at storage
    /// time. The unstructured parser is best-effort: it may return fewer
    /// (or more) stubs than it was given, so its output is appended rather
    /// than matched back to input positions.
    pub async fn resolve(&self, references: &[RawReference]) -> Vec<String> {
        let mut stubs: Vec<ReferenceStub> = Vec::new();
        let mut unstructured: Vec<String> = Vec::new();

        for reference in references {
            match reference {
                RawReference::Structured(stub) => stubs.push(stub.clone()),
                RawReference::Unstructured(text) => unstructured.push(text.clone()),
            }
        }

        debug!(
            ref_count = references.len(),
            structured = stubs.len(),
            unstructured = unstructured.len(),
            op = "resolve_references",
            "Resolving references"
        );

        if !unstructured.is_empty() {
            match self.llm.parse_references(&unstructured).await {
                Ok(parsed) => {
                    if parsed.len() != unstructured.len() {
                        debug!(
                            input_count = unstructured.len(),
                            result_count = parsed.len(),
                            "Citation parser returned a different entry count"
                        );
                    }
                    stubs.extend(parsed);
                }
                Err(e) => {
                    warn!(error = %e, skipped = true, "Citation parsing failed; unstructured references dropped");
                }
            }
        }

        let mut keys = Vec::with_capacity(stubs.len());
        for stub in stubs {
            if let Some(key) = self.key_for(stub).await {
                keys.push(key);
            }
        }
        keys
    }

    /// Complete one stub as far as the sources allow, then key it. A stub
    /// with no title cannot be keyed and yields `None`.
    async fn key_for(&self, stub: ReferenceStub) -> Option<String> {
        // reconcile_minimal is a no-op for already-complete stubs.
        let record = self.reconciler.reconcile_minimal(&stub).await;

        let Some(title) = record.title.as_deref() else {
            debug!(skipped = true, "Dropping titleless reference");
            return None;
        };
        Some(generate_sbkey(
            title,
            record.first_author.as_deref(),
            record.year,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use swingby_core::models::{Answer, ErrorAnalysis, PartialRecord};
    use swingby_core::traits::{AlwaysReject, BibliographicSource, DisambiguationPolicy};
    use swingby_core::Result;

    /// Counting stub LLM: scripted parse output, panics are not needed —
    /// the call counter is the assertion surface.
    #[derive(Default)]
    struct StubLlm {
        parse_output: Vec<ReferenceStub>,
        parse_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LanguageModelService for StubLlm {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0]).collect())
        }

        async fn extract_keywords(
            &self,
            _text: &str,
            _n: usize,
            _ratio: f32,
            _examples: &[String],
        ) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn extract_query_keywords(&self, _question: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn parse_references(
            &self,
            _unstructured: &[String],
        ) -> Result<Vec<ReferenceStub>> {
            self.parse_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.parse_output.clone())
        }

        async fn summarize(&self, _text: &str) -> Result<String> {
            Ok(String::new())
        }

        async fn analyze_error(&self, _text: &str) -> Result<ErrorAnalysis> {
            Ok(ErrorAnalysis::default())
        }

        async fn answer(&self, _query: &str, _context: &str) -> Result<Answer> {
            Ok(Answer::default())
        }
    }

    fn resolver(llm: Arc<StubLlm>, sources: Vec<MockSource>) -> ReferenceResolver {
        let reconciler = Reconciler::new(
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn BibliographicSource>)
                .collect(),
            Arc::new(AlwaysReject) as Arc<dyn DisambiguationPolicy>,
        );
        ReferenceResolver::new(Arc::new(reconciler), llm)
    }

    fn complete_stub(title: &str) -> RawReference {
        RawReference::Structured(ReferenceStub {
            title: Some(title.to_string()),
            first_author: Some("Test, Author".to_string()),
            year: Some(2099),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_structured_complete_stubs_never_call_parser() {
        let llm = Arc::new(StubLlm::default());
        let r = resolver(llm.clone(), vec![MockSource::new("crossref")]);

        let keys = r.resolve(&[complete_stub("The Test Title")]).await;

        assert_eq!(keys, vec!["test..2099the...ttt............."]);
        assert_eq!(llm.parse_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unstructured_references_batched_once() {
        let llm = Arc::new(StubLlm {
            parse_output: vec![ReferenceStub {
                title: Some("The Test Title".into()),
                first_author: Some("Test, Author".into()),
                year: Some(2099),
                ..Default::default()
            }],
            ..Default::default()
        });
        let r = resolver(llm.clone(), vec![MockSource::new("crossref")]);

        let keys = r
            .resolve(&[
                RawReference::Unstructured("Test, Author (2099). The Test Title.".into()),
                RawReference::Unstructured("Garbled citation line".into()),
            ])
            .await;

        assert_eq!(llm.parse_calls.load(Ordering::SeqCst), 1);
        // Parser returned one stub for two inputs: best-effort accepted.
        assert_eq!(keys.len(), 1);
    }

    #[tokio::test]
    async fn test_titleless_stub_dropped_others_keyed() {
        let llm = Arc::new(StubLlm::default());
        let r = resolver(llm, vec![MockSource::new("crossref")]);

        let keys = r
            .resolve(&[
                RawReference::Structured(ReferenceStub {
                    first_author: Some("Test, Author".into()),
                    year: Some(2099),
                    ..Default::default()
                }),
                complete_stub("The Test Title"),
            ])
            .await;

        assert_eq!(keys, vec!["test..2099the...ttt............."]);
    }

    #[tokio::test]
    async fn test_incomplete_stub_completed_via_sources() {
        let source = MockSource::new("crossref").with_identifier_response(
            "10.1/x",
            PartialRecord {
                title: Some("The Test Title".into()),
                first_author: Some("Test, Author".into()),
                year: Some(2099),
                ..Default::default()
            },
        );
        let llm = Arc::new(StubLlm::default());
        let r = resolver(llm, vec![source]);

        let keys = r
            .resolve(&[RawReference::Structured(ReferenceStub {
                doi: Some("10.1/x".into()),
                ..Default::default()
            })])
            .await;

        assert_eq!(keys, vec!["test..2099the...ttt............."]);
    }

    #[tokio::test]
    async fn test_incomplete_stub_keyed_with_degraded_segments() {
        // No source can complete it; the stub keeps a sentinel year.
        let llm = Arc::new(StubLlm::default());
        let r = resolver(llm, vec![MockSource::new("crossref")]);

        let keys = r
            .resolve(&[RawReference::Structured(ReferenceStub {
                title: Some("The Test Title".into()),
                first_author: Some("Test, Author".into()),
                ..Default::default()
            })])
            .await;

        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("test......"));
    }

    #[tokio::test]
    async fn test_duplicates_preserved_in_order() {
        let llm = Arc::new(StubLlm::default());
        let r = resolver(llm, vec![MockSource::new("crossref")]);

        let keys = r
            .resolve(&[complete_stub("The Test Title"), complete_stub("The Test Title")])
            .await;

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
    }
}
