//! Error types shared across the orchestration layers.

use crate::models::ProviderKind;

/// Failure raised at a model adapter boundary.
///
/// The `reason` is kept for diagnostics only; nothing above the dispatcher
/// branches on it.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {provider} unavailable: {reason}")]
    Unavailable {
        provider: ProviderKind,
        reason: String,
    },
    #[error("provider {0} is not configured")]
    NotConfigured(ProviderKind),
}

impl ProviderError {
    pub fn unavailable(provider: ProviderKind, reason: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            ProviderError::Unavailable { provider, .. } => *provider,
            ProviderError::NotConfigured(provider) => *provider,
        }
    }
}

/// Failure of a single search backend. Never escapes `WebSearch`.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Malformed(err.to_string())
        } else {
            SearchError::Request(err.to_string())
        }
    }
}

/// Errors surfaced to callers of the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("Failed to process message")]
    ProcessingFailed(#[from] ProviderError),
}
