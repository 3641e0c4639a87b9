mod common;

use std::sync::Arc;

use aria::agent::{ChatAgent, ConversationStore, SessionStore};
use aria::models::ProviderKind;
use aria::providers::{ModelDispatcher, OpenAIAdapter};
use aria::search::WebSearch;
use aria::server::ws::handle_envelope;
use aria::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

async fn stub_backend() -> String {
    let app = Router::new()
        .route(
            "/chat/completions",
            post(|| async {
                Json(json!({ "choices": [{ "message": { "content": "Hello from the stub" } }] }))
            }),
        )
        .route(
            "/search",
            get(|| async {
                Json(json!({
                    "organic_results": [{ "title": "Rust", "link": "https://rust.test", "snippet": "" }]
                }))
            }),
        );
    common::spawn_stub(app).await
}

async fn make_agent() -> ChatAgent {
    let base = stub_backend().await;
    let adapter = OpenAIAdapter::new(common::provider_config(ProviderKind::OpenAI, &base)).unwrap();
    let dispatcher = ModelDispatcher::new().with_adapter(Arc::new(adapter));
    let search = WebSearch::from_config(&common::search_config(&base)).unwrap();
    ChatAgent::new(search, dispatcher, ProviderKind::OpenAI)
}

async fn make_app() -> Router {
    create_router(AppState::new(make_agent().await, SessionStore::new(10)))
}

fn post_json(uri: &str, session: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with_session(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// REST
// =============================================================================

#[tokio::test]
async fn chat_requires_message() {
    let app = make_app().await;

    for body in [r#"{}"#, r#"{"message": "   "}"#, "not json"] {
        let resp = app.clone().oneshot(post_json("/api/chat", None, body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({ "error": "Message is required" }));
    }
}

#[tokio::test]
async fn chat_round_trip_and_history() {
    let app = make_app().await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/chat", Some("s1"), r#"{"message": "latest news about Rust"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["text"], "Hello from the stub");
    assert_eq!(body["links"], json!(["https://rust.test"]));

    let resp = app
        .clone()
        .oneshot(get_with_session("/api/chat/history", Some("s1")))
        .await
        .unwrap();
    let turns = body_json(resp).await;
    assert_eq!(
        turns,
        json!([
            { "role": "user", "content": "latest news about Rust" },
            { "role": "assistant", "content": "Hello from the stub" }
        ])
    );

    // Other sessions are untouched
    let resp = app
        .clone()
        .oneshot(get_with_session("/api/chat/history", None))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn delete_history_clears_session() {
    let app = make_app().await;

    app.clone()
        .oneshot(post_json("/api/chat", None, r#"{"message": "hello"}"#))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(Request::delete("/api/chat/history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "message": "Conversation history cleared" }));

    let resp = app
        .oneshot(get_with_session("/api/chat/history", None))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn search_endpoint_validates_query() {
    let app = make_app().await;

    let resp = app.clone().oneshot(get_with_session("/api/search", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({ "error": "Search query is required" }));

    let resp = app
        .oneshot(get_with_session("/api/search?query=rust", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["query"], "rust");
    assert_eq!(body["organic_results"][0]["link"], "https://rust.test");
}

#[tokio::test]
async fn health_reports_provider() {
    let app = make_app().await;

    let resp = app.oneshot(get_with_session("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn history_reads_and_deletes_do_not_accumulate_sessions() {
    let sessions = SessionStore::new(10);
    let app = create_router(AppState::new(make_agent().await, sessions.clone()));

    for i in 0..50 {
        let id = format!("visitor-{}", i);
        let resp = app
            .clone()
            .oneshot(get_with_session("/api/chat/history", Some(&id)))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await, json!([]));

        let resp = app
            .clone()
            .oneshot(
                Request::delete("/api/chat/history")
                    .header("x-session-id", id.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(sessions.len().await, 0);

    app.clone()
        .oneshot(post_json("/api/chat", Some("talker"), r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(sessions.len().await, 1);

    app.oneshot(
        Request::delete("/api/chat/history")
            .header("x-session-id", "talker")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(sessions.len().await, 0);
}

#[tokio::test]
async fn chat_session_count_is_capped() {
    let sessions = SessionStore::new(10).with_max_sessions(3);
    let app = create_router(AppState::new(make_agent().await, sessions.clone()));

    for i in 0..10 {
        let id = format!("client-{}", i);
        let resp = app
            .clone()
            .oneshot(post_json("/api/chat", Some(&id), r#"{"message": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(sessions.len().await, 3);
}

#[tokio::test]
async fn malformed_location_gets_body_error() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            None,
            r#"{"message": "hello", "location": {"latitude": "48.1", "longitude": 2.3}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

// =============================================================================
// WebSocket envelopes
// =============================================================================

#[tokio::test]
async fn ws_chat_envelope_gets_chat_response() {
    let agent = make_agent().await;
    let history = Mutex::new(ConversationStore::new(10));

    let reply = handle_envelope(&agent, &history, r#"{"type": "chat", "message": "hi", "language": "en"}"#).await;

    assert_eq!(reply["type"], "chat_response");
    assert_eq!(reply["data"]["text"], "Hello from the stub");
    assert_eq!(history.lock().await.len(), 2);
}

#[tokio::test]
async fn ws_bad_envelopes_get_error_frame() {
    let agent = make_agent().await;
    let history = Mutex::new(ConversationStore::new(10));
    let expected = json!({ "type": "error", "message": "Error processing your request" });

    for text in [
        "{not json",
        r#"{"type": "ping"}"#,
        r#"{"type": "chat"}"#,
        r#"{"type": "chat", "message": ""}"#,
    ] {
        assert_eq!(handle_envelope(&agent, &history, text).await, expected);
    }
    assert!(history.lock().await.is_empty());
}
