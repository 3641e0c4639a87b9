//! Shared state handed to every route handler.

use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;

use crate::agent::{ChatAgent, SessionStore, SharedConversation, DEFAULT_SESSION_ID};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ChatAgent>,
    pub sessions: SessionStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(agent: ChatAgent, sessions: SessionStore) -> Self {
        Self {
            agent: Arc::new(agent),
            sessions,
            start_time: Instant::now(),
        }
    }

    /// History for the request's `x-session-id`, created on first use.
    pub async fn session_for(&self, headers: &HeaderMap) -> SharedConversation {
        self.sessions.session(session_id(headers)).await
    }

    /// Existing history for the request's session, if any.
    pub async fn existing_session(&self, headers: &HeaderMap) -> Option<SharedConversation> {
        self.sessions.get(session_id(headers)).await
    }

    pub async fn remove_session(&self, headers: &HeaderMap) -> bool {
        self.sessions.remove(session_id(headers)).await
    }
}

/// The request's `x-session-id`, or the shared default session.
pub fn session_id(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
}
