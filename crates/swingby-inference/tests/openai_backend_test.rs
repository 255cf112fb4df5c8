//! HTTP-level backend tests against a local mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swingby_core::traits::LanguageModelService;
use swingby_inference::{InferenceConfig, OpenAiBackend};

fn backend(server: &MockServer) -> OpenAiBackend {
    OpenAiBackend::new(InferenceConfig {
        base_url: server.uri(),
        api_key: "test-token".into(),
        embedding_model: "test-embed".into(),
        completion_model: "test-complete".into(),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn chat_reply(content: serde_json::Value) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

#[tokio::test]
async fn test_embed_batches_and_orders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({"model": "test-embed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.1, 0.2], "index": 0},
                {"embedding": [0.3, 0.4], "index": 1}
            ],
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let vectors = backend
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
}

#[tokio::test]
async fn test_embed_empty_input_skips_request() {
    let server = MockServer::start().await;
    let backend = backend(&server);
    assert!(backend.embed(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_extract_keywords_parses_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "test-complete",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
            "keywords": ["astro", "galaxies", "surveys"]
        }))))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let keywords = backend
        .extract_keywords("body text", 3, 0.4, &[])
        .await
        .unwrap();

    assert_eq!(keywords, vec!["astro", "galaxies", "surveys"]);
}

#[tokio::test]
async fn test_keyword_count_mismatch_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
            "keywords": ["only_one"]
        }))))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let keywords = backend.extract_keywords("text", 10, 0.4, &[]).await.unwrap();
    assert_eq!(keywords, vec!["only_one"]);
}

#[tokio::test]
async fn test_parse_references_handles_string_years() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
            "references": [
                {"title": "Cited Work", "first_author": "Smith, J.", "year": "2020"},
                {"title": "Partial"}
            ]
        }))))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let stubs = backend
        .parse_references(&["Smith J. 2020 Cited Work".to_string()])
        .await
        .unwrap();

    assert_eq!(stubs.len(), 2);
    assert_eq!(stubs[0].year, Some(2020));
    assert!(stubs[0].is_complete());
    assert!(!stubs[1].is_complete());
}

#[tokio::test]
async fn test_answer_returns_references() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(json!({
            "answer": "42 [1]",
            "references": ["The Cited Title"]
        }))))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let answer = backend.answer("what?", "context").await.unwrap();

    assert_eq!(answer.answer, "42 [1]");
    assert_eq!(answer.references, vec!["The Cited Title"]);
}

#[tokio::test]
async fn test_non_json_completion_is_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "not json"}}]
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let err = backend.summarize("text").await.unwrap_err();
    assert!(err.to_string().contains("Inference"));
}

#[tokio::test]
async fn test_server_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend(&server);
    assert!(backend.embed(&["text".to_string()]).await.is_err());
}
