//! Crossref REST API adapter.
//!
//! Crossref is the reference-richest provider: besides DOI/year/abstract it
//! returns the outgoing reference list, partly as structured stubs and
//! partly as opaque `unstructured` strings. Its provider identifier is the
//! DOI itself.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use swingby_core::defaults::SOURCE_TIMEOUT;
use swingby_core::models::{PartialRecord, RawReference, ReferenceStub};
use swingby_core::normalize::normalize;
use swingby_core::traits::BibliographicSource;
use swingby_core::{Error, Result};

/// Default Crossref API endpoint.
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org";

pub const SOURCE_ID: &str = "crossref";

pub struct CrossrefSource {
    client: Client,
    base_url: String,
}

impl CrossrefSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_CROSSREF_URL)
    }

    /// Point the adapter at a non-default endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(SOURCE_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::source(SOURCE_ID, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::source(
                SOURCE_ID,
                format!("HTTP {} from {url}", response.status()),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::source(SOURCE_ID, format!("Malformed response: {e}")))
    }
}

#[async_trait]
impl BibliographicSource for CrossrefSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn lookup_by_title(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<PartialRecord>> {
        debug!(source_id = SOURCE_ID, title, "Getting data by title/author");
        let mut query = vec![
            ("query.title", normalize(title)),
            ("rows", "1".to_string()),
        ];
        if let Some(author) = author {
            query.push(("query.author", author.to_string()));
        }

        let response: WorksListResponse = self
            .get_json(format!("{}/works", self.base_url), &query)
            .await?;
        Ok(response
            .message
            .items
            .into_iter()
            .next()
            .map(|work| work.into_partial()))
    }

    async fn lookup_by_identifier(&self, id: &str) -> Result<Option<PartialRecord>> {
        debug!(source_id = SOURCE_ID, id, "Getting data by DOI");
        let response: WorkResponse = self
            .get_json(format!("{}/works/{id}", self.base_url), &[])
            .await?;
        Ok(Some(response.message.into_partial()))
    }

    async fn lookup_by_cross_identifier(
        &self,
        source_id: &str,
        id: &str,
    ) -> Result<Option<PartialRecord>> {
        // Crossref only resolves DOIs; arXiv DOIs arrive through the
        // identifier path already, so only a foreign DOI makes sense here.
        if id.starts_with("10.") {
            return self.lookup_by_identifier(id).await;
        }
        let _ = source_id;
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorksListResponse {
    message: WorksList,
}

#[derive(Debug, Default, Deserialize)]
struct WorksList {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct WorkResponse {
    message: Work,
}

#[derive(Debug, Default, Deserialize)]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<Contributor>,
    issued: Option<DateParts>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    reference: Vec<WorkReference>,
}

#[derive(Debug, Default, Deserialize)]
struct Contributor {
    family: Option<String>,
    given: Option<String>,
    name: Option<String>,
}

impl Contributor {
    /// "Family, Given" when both parts exist, otherwise whatever single
    /// name the record carries.
    fn display(&self) -> Option<String> {
        match (&self.family, &self.given) {
            (Some(family), Some(given)) => Some(format!("{family}, {given}")),
            (Some(family), None) => Some(family.clone()),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first().and_then(|p| p.first()).copied().flatten()
    }
}

#[derive(Debug, Default, Deserialize)]
struct WorkReference {
    #[serde(rename = "article-title")]
    article_title: Option<String>,
    #[serde(rename = "series-title")]
    series_title: Option<String>,
    author: Option<String>,
    /// Crossref serializes reference years inconsistently (number or
    /// string); accept both.
    year: Option<serde_json::Value>,
    unstructured: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

impl WorkReference {
    fn year_i32(&self) -> Option<i32> {
        match &self.year {
            Some(serde_json::Value::Number(n)) => n.as_i64().map(|y| y as i32),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn into_raw(self) -> Option<RawReference> {
        let title = self.article_title.clone().or_else(|| self.series_title.clone());
        if title.is_some() || self.author.is_some() || self.doi.is_some() {
            let year = self.year_i32();
            return Some(RawReference::Structured(ReferenceStub {
                title,
                first_author: self.author,
                year,
                doi: self.doi,
                identifier: None,
            }));
        }
        self.unstructured.map(RawReference::Unstructured)
    }
}

impl Work {
    fn into_partial(self) -> PartialRecord {
        let title = self.title.into_iter().next();
        let first_author = self.author.first().and_then(Contributor::display);
        let year = self.issued.as_ref().and_then(DateParts::year);
        let references = self
            .reference
            .into_iter()
            .filter_map(WorkReference::into_raw)
            .collect();

        PartialRecord {
            title,
            first_author,
            year,
            // Crossref's provider identifier is the DOI.
            identifier: self.doi.clone(),
            doi: self.doi,
            abstract_text: self.abstract_text,
            references,
        }
    }
}
