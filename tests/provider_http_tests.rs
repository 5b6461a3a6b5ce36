//! HTTP adapter tests against a mock backend.
//!
//! Each adapter's request construction (auth placement, body shape) and
//! response extraction are exercised against wiremock, including the
//! normalization of transport and protocol failures. Credentials are read
//! at adapter construction, so adapters are built inside the env guard and
//! driven outside it.

use epigram::error::ProviderError;
use epigram::provider::gemini::GeminiAdapter;
use epigram::provider::ollama::OllamaAdapter;
use epigram::provider::openai::OpenAiAdapter;
use epigram::provider::{ProviderAdapter, SamplingParams};

use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params() -> SamplingParams {
    SamplingParams {
        model: "gpt-4".to_string(),
        temperature: 0.3,
        max_tokens: 100,
    }
}

fn openai_adapter(base_url: &str) -> OpenAiAdapter {
    temp_env::with_var("OPENAI_API_KEY", Some("sk-test"), || {
        OpenAiAdapter::with_base_url(base_url)
    })
}

fn gemini_adapter(base_url: &str) -> GeminiAdapter {
    temp_env::with_vars(
        [("GEMINI_API_KEY", Some("g-test")), ("GOOGLE_API_KEY", None)],
        || GeminiAdapter::with_base_url(base_url),
    )
}

// ============================================
// OpenAI (bearer-token auth)
// ============================================

#[tokio::test]
#[serial]
async fn test_openai_sends_bearer_auth_and_extracts_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  feat: add parser  "}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = openai_adapter(&server.uri());
    let result = adapter.generate("prompt", &params()).await;

    assert_eq!(result.unwrap(), "feat: add parser");
}

#[tokio::test]
#[serial]
async fn test_openai_error_status_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let adapter = openai_adapter(&server.uri());
    let result = adapter.generate("prompt", &params()).await;

    match result {
        Err(ProviderError::Protocol { provider, status, detail }) => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(status, "429");
            assert!(detail.contains("rate limited"));
        }
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_openai_unexpected_shape_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let adapter = openai_adapter(&server.uri());
    let result = adapter.generate("prompt", &params()).await;

    assert!(matches!(result, Err(ProviderError::Protocol { .. })));
}

#[tokio::test]
#[serial]
async fn test_openai_empty_choices_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let adapter = openai_adapter(&server.uri());
    let result = adapter.generate("prompt", &params()).await;

    match result {
        Err(ProviderError::Protocol { detail, .. }) => {
            assert!(detail.contains("no choices"));
        }
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_openai_connection_refused_is_unavailable() {
    // Nothing listens on port 1.
    let adapter = openai_adapter("http://127.0.0.1:1");
    let result = adapter.generate("prompt", &params()).await;

    match result {
        Err(ProviderError::Unavailable { provider, .. }) => assert_eq!(provider, "OpenAI"),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

// ============================================
// Gemini (query-string key auth)
// ============================================

#[tokio::test]
#[serial]
async fn test_gemini_sends_key_as_query_param() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "g-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "fix: handle empty input\n"}]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = params();
    p.model = "gemini-pro".to_string();

    let adapter = gemini_adapter(&server.uri());
    let result = adapter.generate("prompt", &p).await;

    assert_eq!(result.unwrap(), "fix: handle empty input");
}

#[tokio::test]
#[serial]
async fn test_gemini_missing_candidates_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let mut p = params();
    p.model = "gemini-pro".to_string();

    let adapter = gemini_adapter(&server.uri());
    let result = adapter.generate("prompt", &p).await;

    match result {
        Err(ProviderError::Protocol { provider, detail, .. }) => {
            assert_eq!(provider, "Gemini");
            assert!(detail.contains("no candidates"));
        }
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

// ============================================
// Ollama (local process, no auth)
// ============================================

#[tokio::test]
async fn test_ollama_is_configured_when_server_answers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let adapter = OllamaAdapter::with_base_url(server.uri());
    assert!(adapter.is_configured().await);
}

#[tokio::test]
async fn test_ollama_generate_extracts_response_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "codellama:7b",
            "response": "chore: bump dependencies\n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = params();
    p.model = "codellama:7b".to_string();

    let result = OllamaAdapter::with_base_url(server.uri())
        .generate("prompt", &p)
        .await;

    assert_eq!(result.unwrap(), "chore: bump dependencies");
}

#[tokio::test]
async fn test_ollama_error_status_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let result = OllamaAdapter::with_base_url(server.uri())
        .generate("prompt", &params())
        .await;

    match result {
        Err(ProviderError::Protocol { provider, status, .. }) => {
            assert_eq!(provider, "Ollama");
            assert_eq!(status, "404");
        }
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ollama_connection_refused_is_unavailable() {
    let adapter = OllamaAdapter::with_base_url("http://127.0.0.1:1");
    let result = adapter.generate("prompt", &params()).await;
    assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
}
