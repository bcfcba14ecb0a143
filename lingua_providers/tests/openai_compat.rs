//! Integration tests for `OpenAiProvider` against a local fake endpoint.
//!
//! These tests verify that:
//! - Requests carry the bearer token, model and JSON response format
//! - Server errors are retried, client errors are not
//! - Missing message content becomes empty content

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use lingua_core::{ChatMessage, ChatRequest, LLMProvider};
use lingua_providers::OpenAiProvider;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned endpoint: fails the first `failures` calls with `failure_status`.
struct FakeEndpoint {
    failures: usize,
    failure_status: StatusCode,
    answer: Value,
    calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
    last_auth: Mutex<Option<String>>,
}

impl FakeEndpoint {
    fn new(answer: Value) -> Self {
        Self {
            failures: 0,
            failure_status: StatusCode::INTERNAL_SERVER_ERROR,
            answer,
            calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
            last_auth: Mutex::new(None),
        }
    }

    fn failing_first(mut self, failures: usize, status: StatusCode) -> Self {
        self.failures = failures;
        self.failure_status = status;
        self
    }
}

async fn completions(
    State(fake): State<Arc<FakeEndpoint>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = fake.calls.fetch_add(1, Ordering::SeqCst);
    *fake.last_body.lock().unwrap() = Some(body);
    *fake.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if call < fake.failures {
        return (fake.failure_status, Json(json!({ "error": "try later" })));
    }
    (StatusCode::OK, Json(fake.answer.clone()))
}

async fn spawn_fake(fake: Arc<FakeEndpoint>) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn provider(base_url: String) -> OpenAiProvider {
    OpenAiProvider::new("test-key".to_string())
        .with_base_url(base_url)
        .with_retry_delays(vec![Duration::from_millis(5), Duration::from_millis(5)])
}

fn translate_request() -> ChatRequest {
    ChatRequest {
        model: "gpt-5-nano".to_string(),
        messages: vec![
            ChatMessage::system("Translate to Spanish"),
            ChatMessage::user("Good night"),
        ],
        json_output: true,
    }
}

fn answer(content: Value) -> Value {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
}

#[tokio::test]
async fn test_chat_sends_expected_request() {
    let fake = Arc::new(FakeEndpoint::new(answer(json!("{\"translation\":\"Buenas noches\"}"))));
    let base_url = spawn_fake(fake.clone()).await;

    let response = provider(base_url).chat(&translate_request()).await.unwrap();

    assert_eq!(response.content, "{\"translation\":\"Buenas noches\"}");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(17));

    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gpt-5-nano");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][1]["content"], "Good night");
    assert_eq!(
        fake.last_auth.lock().unwrap().as_deref(),
        Some("Bearer test-key")
    );
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let fake = Arc::new(
        FakeEndpoint::new(answer(json!("{\"translation\":\"Hola\"}")))
            .failing_first(2, StatusCode::SERVICE_UNAVAILABLE),
    );
    let base_url = spawn_fake(fake.clone()).await;

    let response = provider(base_url).chat(&translate_request()).await.unwrap();

    assert_eq!(response.content, "{\"translation\":\"Hola\"}");
    assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_fail_immediately() {
    let fake = Arc::new(
        FakeEndpoint::new(answer(json!("unused"))).failing_first(10, StatusCode::UNAUTHORIZED),
    );
    let base_url = spawn_fake(fake.clone()).await;

    let err = provider(base_url)
        .chat(&translate_request())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("401"));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retries_give_up_after_configured_delays() {
    let fake = Arc::new(
        FakeEndpoint::new(answer(json!("unused")))
            .failing_first(10, StatusCode::INTERNAL_SERVER_ERROR),
    );
    let base_url = spawn_fake(fake.clone()).await;

    assert!(provider(base_url).chat(&translate_request()).await.is_err());
    assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_null_content_becomes_empty() {
    let fake = Arc::new(FakeEndpoint::new(answer(Value::Null)));
    let base_url = spawn_fake(fake).await;

    let response = provider(base_url).chat(&translate_request()).await.unwrap();

    assert_eq!(response.content, "");
}
