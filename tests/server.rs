//! Router-level tests for the chat endpoint.

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use react_agent::{Agent, AgentServer, StubModel};
use serde_json::{json, Value};
use tower::ServiceExt;

fn server(responses: Vec<&str>) -> AgentServer<StubModel> {
    let model = StubModel::new(responses.into_iter().map(String::from).collect());
    AgentServer::new(Agent::new(model))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_returns_the_agent_answer() {
    let app = server(vec![r#"{"action":null,"final_answer":"Hello there"}"#]).router();

    let response = app
        .oneshot(chat_request(json!({"message": "hi"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"response": "Hello there"}));
}

#[tokio::test]
async fn failures_inside_the_loop_are_still_200() {
    let app = server(vec![]).router();

    let response = app
        .oneshot(chat_request(json!({"message": "hi"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"response": react_agent::MODEL_UNAVAILABLE_MESSAGE})
    );
}

#[tokio::test]
async fn empty_message_is_rejected() {
    for body in [json!({"message": ""}), json!({})] {
        let app = server(vec![]).router();
        let response = app.oneshot(chat_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No message provided"}));
    }
}

#[tokio::test]
async fn health_and_index_are_served() {
    let app = server(vec![]).router();

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let index = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(index.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("ReAct Agent"));
}
