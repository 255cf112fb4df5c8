//! HTTP-level adapter tests against a local mock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swingby_core::traits::BibliographicSource;
use swingby_sources::{AdsSource, ArxivSource, CrossrefSource};

#[tokio::test]
async fn test_crossref_title_lookup_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query.title", "the test title"))
        .and(query_param("rows", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "items": [{
                    "title": ["The Test Title"],
                    "author": [{"family": "Test", "given": "Author"}],
                    "issued": {"date-parts": [[2099]]},
                    "DOI": "10.1000/test"
                }]
            }
        })))
        .mount(&server)
        .await;

    let source = CrossrefSource::with_base_url(server.uri()).unwrap();
    let partial = source
        .lookup_by_title("The Test Title!", Some("Test, Author"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(partial.title.as_deref(), Some("The Test Title"));
    assert_eq!(partial.year, Some(2099));
    assert_eq!(partial.doi.as_deref(), Some("10.1000/test"));
}

#[tokio::test]
async fn test_crossref_doi_lookup_uses_works_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works/10.1000/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "title": ["The Test Title"],
                "DOI": "10.1000/test"
            }
        })))
        .mount(&server)
        .await;

    let source = CrossrefSource::with_base_url(server.uri()).unwrap();
    let partial = source
        .lookup_by_identifier("10.1000/test")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(partial.identifier.as_deref(), Some("10.1000/test"));
}

#[tokio::test]
async fn test_crossref_empty_result_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"items": []}})),
        )
        .mount(&server)
        .await;

    let source = CrossrefSource::with_base_url(server.uri()).unwrap();
    let partial = source.lookup_by_title("Anything", None).await.unwrap();
    assert!(partial.is_none());
}

#[tokio::test]
async fn test_crossref_server_error_is_source_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = CrossrefSource::with_base_url(server.uri()).unwrap();
    let err = source.lookup_by_title("Anything", None).await.unwrap_err();
    assert!(err.to_string().contains("crossref"));
}

#[tokio::test]
async fn test_ads_search_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/query"))
        .and(wiremock::matchers::header(
            "Authorization",
            "Bearer test-token",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "docs": [{
                    "title": ["The Test Title"],
                    "first_author": "Test, Author",
                    "year": "2099",
                    "bibcode": "2099ApJ...900....1T"
                }]
            }
        })))
        .mount(&server)
        .await;

    let source = AdsSource::with_base_url("test-token", server.uri()).unwrap();
    let partial = source
        .lookup_by_title("The Test Title", None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(partial.identifier.as_deref(), Some("2099ApJ...900....1T"));
    assert_eq!(partial.year, Some(2099));
}

#[tokio::test]
async fn test_ads_maintenance_page_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html>maintenance</html>"),
        )
        .mount(&server)
        .await;

    let source = AdsSource::with_base_url("t", server.uri()).unwrap();
    let err = source.lookup_by_title("Anything", None).await.unwrap_err();
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn test_ads_identifier_routing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/query"))
        .and(query_param("q", "doi:10.1000/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"docs": [{"title": ["By DOI"]}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/query"))
        .and(query_param("q", "bibcode:2099ApJ...900....1T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"docs": [{"title": ["By bibcode"]}]}
        })))
        .mount(&server)
        .await;

    let source = AdsSource::with_base_url("t", server.uri()).unwrap();
    let by_doi = source.lookup_by_identifier("10.1000/test").await.unwrap().unwrap();
    let by_bibcode = source
        .lookup_by_identifier("2099ApJ...900....1T")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_doi.title.as_deref(), Some("By DOI"));
    assert_eq!(by_bibcode.title.as_deref(), Some("By bibcode"));
}

#[tokio::test]
async fn test_arxiv_title_lookup_parses_feed() {
    let server = MockServer::start().await;
    let feed = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <title>The Test Title</title>
    <summary>A summary.</summary>
    <author><name>Author Test</name></author>
    <arxiv:doi>10.1000/test</arxiv:doi>
  </entry>
</feed>"#;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&server)
        .await;

    let source = ArxivSource::with_base_url(server.uri()).unwrap();
    let partial = source
        .lookup_by_title("The Test Title", Some("Test, Author"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(partial.identifier.as_deref(), Some("2101.00001v1"));
    assert_eq!(partial.abstract_text.as_deref(), Some("A summary."));
}
