//! arXiv Atom API adapter.
//!
//! arXiv answers with an Atom feed rather than JSON; the single
//! best-relevance entry is pulled out of the XML. arXiv supplies the
//! preprint identifier, summary, and (when registered) DOI, but no
//! publication year and no reference list.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use tracing::debug;

use swingby_core::defaults::SOURCE_TIMEOUT;
use swingby_core::models::PartialRecord;
use swingby_core::normalize::normalize;
use swingby_core::traits::BibliographicSource;
use swingby_core::{Error, Result};

/// Default arXiv export endpoint.
pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api";

pub const SOURCE_ID: &str = "arxiv";

pub struct ArxivSource {
    client: Client,
    base_url: String,
}

impl ArxivSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_ARXIV_URL)
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

    async fn query(&self, params: &[(&str, String)]) -> Result<Option<PartialRecord>> {
        let response = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(params)
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
        parse_feed(&body)
    }
}

#[async_trait]
impl BibliographicSource for ArxivSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn lookup_by_title(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<PartialRecord>> {
        debug!(source_id = SOURCE_ID, title, "Getting data by title/author");
        let mut search = format!("ti:\"{}\"", normalize(title));
        if let Some(author) = author {
            search.push_str(&format!(" AND au:\"{author}\""));
        }
        self.query(&[
            ("search_query", search),
            ("max_results", "1".to_string()),
            ("sortBy", "relevance".to_string()),
        ])
        .await
    }

    async fn lookup_by_identifier(&self, id: &str) -> Result<Option<PartialRecord>> {
        if id.starts_with("10.") {
            debug!(source_id = SOURCE_ID, id, "Getting data by DOI");
            self.query(&[
                ("search_query", format!("all:\"{id}\"")),
                ("max_results", "1".to_string()),
            ])
            .await
        } else {
            debug!(source_id = SOURCE_ID, id, "Getting data by arXiv id");
            self.query(&[("id_list", id.to_string()), ("max_results", "1".to_string())])
                .await
        }
    }

    async fn lookup_by_cross_identifier(
        &self,
        source_id: &str,
        id: &str,
    ) -> Result<Option<PartialRecord>> {
        // Only a DOI harvested elsewhere is resolvable here; bibcodes mean
        // nothing to arXiv.
        if source_id == "crossref" || id.starts_with("10.") {
            return self.lookup_by_identifier(id).await;
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Atom feed parsing
// ---------------------------------------------------------------------------

/// Pull the first `<entry>` out of an Atom feed.
///
/// The feed element carries its own `<title>` and `<id>`, so everything is
/// gated on being inside an entry. Multi-line titles are whitespace-
/// collapsed.
fn parse_feed(xml: &str) -> Result<Option<PartialRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_entry = false;
    let mut path: Vec<String> = Vec::new();

    let mut id = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut first_author = String::new();
    let mut doi = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "entry" {
                    in_entry = true;
                }
                path.push(name);
            }
            Ok(Event::Text(t)) if in_entry => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::source(SOURCE_ID, format!("Malformed feed: {e}")))?;
                let target = match path.last().map(String::as_str) {
                    Some("id") => Some(&mut id),
                    Some("title") => Some(&mut title),
                    Some("summary") => Some(&mut summary),
                    Some("doi") => Some(&mut doi),
                    Some("name") if first_author.is_empty() => Some(&mut first_author),
                    _ => None,
                };
                if let Some(target) = target {
                    if !target.is_empty() {
                        target.push(' ');
                    }
                    target.push_str(text.trim());
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                path.pop();
                if name == "entry" {
                    // Only the first entry is wanted.
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::source(SOURCE_ID, format!("Malformed feed: {e}")));
            }
            _ => {}
        }
    }

    if !in_entry || title.is_empty() {
        return Ok(None);
    }

    // "http://arxiv.org/abs/2101.00001v2" -> "2101.00001v2"
    let identifier = id.rsplit('/').next().unwrap_or_default().to_string();

    Ok(Some(PartialRecord {
        title: Some(collapse_whitespace(&title)),
        first_author: none_if_empty(first_author),
        year: None,
        identifier: none_if_empty(identifier),
        doi: none_if_empty(doi),
        abstract_text: none_if_empty(collapse_whitespace(&summary)),
        references: Vec::new(),
    }))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title>ArXiv Query: search_query=ti:"the test title"</title>
  <id>http://arxiv.org/api/feedid</id>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v2</id>
    <title>The Test
        Title</title>
    <summary>A summary
        spanning lines.</summary>
    <author><name>Author Test</name></author>
    <author><name>Second Person</name></author>
    <arxiv:doi>10.1000/test</arxiv:doi>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/9999.99999v1</id>
    <title>Another Entry</title>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_takes_first_entry() {
        let partial = parse_feed(FEED).unwrap().unwrap();
        assert_eq!(partial.title.as_deref(), Some("The Test Title"));
        assert_eq!(partial.identifier.as_deref(), Some("2101.00001v2"));
        assert_eq!(partial.doi.as_deref(), Some("10.1000/test"));
        assert_eq!(partial.first_author.as_deref(), Some("Author Test"));
        assert_eq!(
            partial.abstract_text.as_deref(),
            Some("A summary spanning lines.")
        );
        assert_eq!(partial.year, None);
        assert!(partial.references.is_empty());
    }

    #[test]
    fn test_parse_feed_without_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_none());
    }

    #[test]
    fn test_parse_feed_ignores_feed_level_title() {
        let xml = r#"<feed><title>Feed Title</title><entry><id>http://arxiv.org/abs/1</id><title>Entry Title</title></entry></feed>"#;
        let partial = parse_feed(xml).unwrap().unwrap();
        assert_eq!(partial.title.as_deref(), Some("Entry Title"));
    }
}
