//! Scripted in-memory bibliographic source for deterministic tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use swingby_core::models::PartialRecord;
use swingby_core::traits::BibliographicSource;
use swingby_core::{Error, Result};

/// One logged lookup against a [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockLookup {
    Title(String),
    Identifier(String),
    Cross(String, String),
}

/// Mock bibliographic source with scripted responses and a call log.
#[derive(Clone, Default)]
pub struct MockSource {
    id: String,
    title_response: Option<PartialRecord>,
    title_responses: HashMap<String, PartialRecord>,
    identifier_responses: HashMap<String, PartialRecord>,
    cross_responses: HashMap<(String, String), PartialRecord>,
    fail_title: bool,
    calls: Arc<Mutex<Vec<MockLookup>>>,
}

impl MockSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Respond to any title lookup with this record.
    pub fn with_title_response(mut self, record: PartialRecord) -> Self {
        self.title_response = Some(record);
        self
    }

    /// Respond to a lookup for this exact title (normalized comparison is
    /// the caller's concern; matching here is literal).
    pub fn with_title_mapping(
        mut self,
        title: impl Into<String>,
        record: PartialRecord,
    ) -> Self {
        self.title_responses.insert(title.into(), record);
        self
    }

    /// Respond to `lookup_by_identifier(id)` with this record.
    pub fn with_identifier_response(
        mut self,
        id: impl Into<String>,
        record: PartialRecord,
    ) -> Self {
        self.identifier_responses.insert(id.into(), record);
        self
    }

    /// Respond to `lookup_by_cross_identifier(source_id, id)` with this
    /// record.
    pub fn with_cross_response(
        mut self,
        source_id: impl Into<String>,
        id: impl Into<String>,
        record: PartialRecord,
    ) -> Self {
        self.cross_responses
            .insert((source_id.into(), id.into()), record);
        self
    }

    /// Make title lookups fail with a transient provider error.
    pub fn with_title_failure(mut self) -> Self {
        self.fail_title = true;
        self
    }

    /// All lookups issued against this source, in order.
    pub fn calls(&self) -> Vec<MockLookup> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn log(&self, call: MockLookup) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BibliographicSource for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn lookup_by_title(
        &self,
        title: &str,
        _author: Option<&str>,
    ) -> Result<Option<PartialRecord>> {
        self.log(MockLookup::Title(title.to_string()));
        if self.fail_title {
            return Err(Error::source(&self.id, "simulated outage"));
        }
        Ok(self
            .title_responses
            .get(title)
            .cloned()
            .or_else(|| self.title_response.clone()))
    }

    async fn lookup_by_identifier(&self, id: &str) -> Result<Option<PartialRecord>> {
        self.log(MockLookup::Identifier(id.to_string()));
        Ok(self.identifier_responses.get(id).cloned())
    }

    async fn lookup_by_cross_identifier(
        &self,
        source_id: &str,
        id: &str,
    ) -> Result<Option<PartialRecord>> {
        self.log(MockLookup::Cross(source_id.to_string(), id.to_string()));
        Ok(self
            .cross_responses
            .get(&(source_id.to_string(), id.to_string()))
            .cloned())
    }
}
