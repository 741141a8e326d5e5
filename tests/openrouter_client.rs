//! HTTP mock tests for the OpenRouter client.

use react_agent::{AgentError, LanguageModel, Message, ModelConfig, OpenRouterClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenRouterClient {
    let cfg = ModelConfig {
        api_key: Some("test-api-key".into()),
        base_url: format!("{}/api/v1/", server.uri()),
        ..ModelConfig::default()
    };
    OpenRouterClient::from_config(&cfg).unwrap()
}

fn history() -> Vec<Message> {
    vec![Message::system("rules"), Message::user("Hello")]
}

#[tokio::test]
async fn returns_assistant_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "model": "openai/gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "rules"},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"action\":null}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete(&history()).await.unwrap();

    assert_eq!(reply, "{\"action\":null}");
}

#[tokio::test]
async fn rate_limit_is_reported_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    match err {
        AgentError::LanguageModel(msg) => {
            assert!(msg.contains("rate limit"));
            assert!(msg.contains("slow down"));
        }
        other => panic!("expected LanguageModel error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_reported_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    match err {
        AgentError::LanguageModel(msg) => assert!(msg.contains("500")),
        other => panic!("expected LanguageModel error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_envelope_is_reported_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    assert!(matches!(err, AgentError::LanguageModel(msg) if msg.contains("parse error")));
}

#[tokio::test]
async fn empty_choices_are_reported_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    assert!(matches!(err, AgentError::LanguageModel(msg) if msg.contains("no choices")));
}

#[tokio::test]
async fn null_content_is_reported_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": null}}]})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    assert!(matches!(err, AgentError::LanguageModel(msg) if msg.contains("empty content")));
}
