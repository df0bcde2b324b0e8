use std::sync::{Arc, Mutex};

use api_lib::adapters::MessagesApiAdapter;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tutor_core::{LanguageModelService, PortError};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn messages(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.seen.lock().unwrap().push((headers, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Serves `reply` on a random local port and returns the endpoint URL.
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Stub) {
    let stub = Stub {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1/messages", addr), stub)
}

fn adapter(endpoint: String, api_key: Option<&str>) -> MessagesApiAdapter {
    MessagesApiAdapter::new(
        reqwest::Client::new(),
        endpoint,
        "test-model".to_string(),
        2000,
        api_key.map(str::to_string),
    )
}

#[tokio::test]
async fn sends_single_turn_request_and_returns_first_text_block() {
    let (endpoint, stub) = spawn_stub(
        StatusCode::OK,
        json!({ "content": [{ "type": "text", "text": "Sure! {\"ok\": true}" }] }),
    )
    .await;
    let client = adapter(endpoint, Some("secret"));

    let text = client.complete_text("be brief", "say hi").await.unwrap();
    assert_eq!(text, "Sure! {\"ok\": true}");

    let seen = stub.seen.lock().unwrap();
    let (headers, body) = &seen[0];
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["max_tokens"], 2000);
    assert_eq!(body["system"], "be brief");
    assert_eq!(body["messages"], json!([{ "role": "user", "content": "say hi" }]));
    assert_eq!(headers["x-api-key"], "secret");
    assert!(headers.contains_key("anthropic-version"));
}

#[tokio::test]
async fn complete_extracts_embedded_json() {
    let (endpoint, _stub) = spawn_stub(
        StatusCode::OK,
        json!({ "content": [{ "type": "text", "text": "Here you go:\n{\"report\": \"좋아요\"}\nBye" }] }),
    )
    .await;
    let client = adapter(endpoint, None);

    let value = client.complete("sys", "user").await.unwrap();
    assert_eq!(value, json!({ "report": "좋아요" }));
}

#[tokio::test]
async fn omits_auth_headers_without_a_key() {
    let (endpoint, stub) = spawn_stub(
        StatusCode::OK,
        json!({ "content": [{ "type": "text", "text": "{}" }] }),
    )
    .await;
    adapter(endpoint, None).complete_text("s", "u").await.unwrap();

    let seen = stub.seen.lock().unwrap();
    assert!(!seen[0].0.contains_key("x-api-key"));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let (endpoint, _stub) = spawn_stub(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "type": "rate_limit_error" } }),
    )
    .await;

    let err = adapter(endpoint, None).complete_text("s", "u").await.unwrap_err();
    assert!(matches!(err, PortError::ModelTransport(_)));
}

#[tokio::test]
async fn missing_text_content_is_a_response_error() {
    let (endpoint, _stub) = spawn_stub(StatusCode::OK, json!({ "content": [] })).await;

    let err = adapter(endpoint, None).complete_text("s", "u").await.unwrap_err();
    assert!(matches!(err, PortError::ModelResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = adapter(format!("http://{}/v1/messages", addr), None)
        .complete_text("s", "u")
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::ModelTransport(_)));
}
