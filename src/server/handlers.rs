//! REST handlers for chat, history, search, and health.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::language::DEFAULT_LANGUAGE;
use crate::models::{ChatResponse, LocationContext, ModelMetrics, Turn};
use crate::search::SearchEvidence;

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub location: Option<LocationContext>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: String,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = parse_chat_request(&body)?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;

    let history = state.session_for(&headers).await;
    let response = state
        .agent
        .process_message(
            &history,
            &message,
            request.language.as_deref(),
            request.location.as_ref(),
        )
        .await?;

    Ok(Json(response))
}

/// A body without a usable `message` is reported as such; a body that has
/// one but fails to deserialize elsewhere (e.g. `location`) is reported as
/// an invalid body.
fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, ApiError> {
    let missing_message = || ApiError::BadRequest("Message is required".to_string());

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected chat body: {}", e);
        missing_message()
    })?;

    let has_message = value
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|m| !m.trim().is_empty());

    serde_json::from_value(value).map_err(|e| {
        warn!("Rejected chat body: {}", e);
        if has_message {
            ApiError::BadRequest(format!("Invalid request body: {}", e))
        } else {
            missing_message()
        }
    })
}

/// GET /api/chat/history
pub async fn history(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<Turn>> {
    let turns = match state.existing_session(&headers).await {
        Some(history) => history.lock().await.get_all().to_vec(),
        None => Vec::new(),
    };
    Json(turns)
}

/// DELETE /api/chat/history
pub async fn clear_history(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(history) = state.existing_session(&headers).await {
        history.lock().await.clear();
    }
    state.remove_session(&headers).await;
    info!("Conversation history cleared");

    Json(MessageResponse {
        message: "Conversation history cleared".to_string(),
    })
}

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchEvidence>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;
    let language = params
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let evidence = state.agent.web_search().search(&query, &language).await;
    Ok(Json(evidence))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.agent.provider().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sessions: state.sessions.len().await,
        metrics: state.agent.metrics().await,
    })
}
