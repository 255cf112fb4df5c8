//! NASA ADS search API adapter.
//!
//! ADS is the only provider behind a required credential, and the only one
//! whose outgoing references arrive as bare bibcodes; those become
//! identifier-only stubs that the reference resolver completes through a
//! reduced reconciliation pass. ADS occasionally serves an HTML maintenance
//! page with a 200 status, which is detected and treated as an outage.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use swingby_core::defaults::SOURCE_TIMEOUT;
use swingby_core::models::{PartialRecord, RawReference, ReferenceStub, SourceIdentifier};
use swingby_core::normalize::normalize;
use swingby_core::traits::BibliographicSource;
use swingby_core::{Error, Result};

/// Default ADS API endpoint.
pub const DEFAULT_ADS_URL: &str = "https://api.adsabs.harvard.edu/v1";

/// Environment variable holding the ADS token.
pub const ADS_API_KEY_VAR: &str = "ADS_API_KEY";

pub const SOURCE_ID: &str = "ads";

/// Fields requested from the search endpoint.
const FIELD_LIST: &str = "reference,doi,abstract,title,first_author,bibcode,year";

pub struct AdsSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AdsSource {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_ADS_URL)
    }

    /// Point the adapter at a non-default endpoint (tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(SOURCE_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from the environment. The token is a required credential:
    /// absence is a configuration error, fatal at startup.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ADS_API_KEY_VAR)
            .map_err(|_| Error::Config(format!("{ADS_API_KEY_VAR} is not set")))?;
        Self::new(api_key)
    }

    async fn search(&self, query: String) -> Result<Option<AdsDoc>> {
        debug!(source_id = SOURCE_ID, query, "Sending API request");
        let response = self
            .client
            .get(format!("{}/search/query", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("q", query.as_str()), ("fl", FIELD_LIST)])
            .send()
            .await
            .map_err(|e| Error::source(SOURCE_ID, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::source(
                SOURCE_ID,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::source(SOURCE_ID, e.to_string()))?;
        if body.contains("<!DOCTYPE html>") {
            return Err(Error::source(SOURCE_ID, "ADS is currently under maintenance"));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::source(SOURCE_ID, format!("Malformed response: {e}")))?;
        Ok(parsed.response.docs.into_iter().next())
    }
}

#[async_trait]
impl BibliographicSource for AdsSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn lookup_by_title(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<PartialRecord>> {
        debug!(source_id = SOURCE_ID, title, "Getting data by title/author");
        let mut query = format!("title:\"{}\"", normalize(title));
        if let Some(author) = author {
            query.push_str(&format!(" author:\"{author}\""));
        }
        Ok(self.search(query).await?.map(AdsDoc::into_partial))
    }

    async fn lookup_by_identifier(&self, id: &str) -> Result<Option<PartialRecord>> {
        let query = if id.starts_with("10.") {
            debug!(source_id = SOURCE_ID, id, "Getting data by DOI");
            format!("doi:{id}")
        } else {
            debug!(source_id = SOURCE_ID, id, "Getting data by bibcode");
            format!("bibcode:{id}")
        };
        Ok(self.search(query).await?.map(AdsDoc::into_partial))
    }

    async fn lookup_by_cross_identifier(
        &self,
        source_id: &str,
        id: &str,
    ) -> Result<Option<PartialRecord>> {
        let query = match source_id {
            "arxiv" => format!("arXiv:{id}"),
            // Crossref's identifier is a DOI.
            "crossref" => format!("doi:{id}"),
            _ => return Ok(None),
        };
        debug!(source_id = SOURCE_ID, query, "Getting data by cross-identifier");
        Ok(self.search(query).await?.map(AdsDoc::into_partial))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    docs: Vec<AdsDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct AdsDoc {
    #[serde(default)]
    title: Vec<String>,
    first_author: Option<String>,
    year: Option<String>,
    bibcode: Option<String>,
    #[serde(default)]
    doi: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    reference: Vec<String>,
}

impl AdsDoc {
    fn into_partial(self) -> PartialRecord {
        let references = self
            .reference
            .into_iter()
            .map(|bibcode| {
                RawReference::Structured(ReferenceStub {
                    identifier: Some(SourceIdentifier::new(SOURCE_ID, bibcode)),
                    ..Default::default()
                })
            })
            .collect();

        PartialRecord {
            title: self.title.into_iter().next(),
            first_author: self.first_author,
            year: self.year.and_then(|y| y.trim().parse().ok()),
            identifier: self.bibcode,
            doi: self.doi.into_iter().next(),
            abstract_text: self.abstract_text,
            references,
        }
    }
}
