//! API error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ChatError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - missing or invalid input.
    BadRequest(String),
    /// 500 - processing failed; `details` is the coarse cause only.
    Internal { error: String, details: Option<String> },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(error) => (StatusCode::BAD_REQUEST, ErrorBody { error, details: None }),
            ApiError::Internal { error, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody { error, details })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest("Message is required".to_string()),
            ChatError::ProcessingFailed(_) => ApiError::Internal {
                error: "Failed to process chat message".to_string(),
                details: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::models::ProviderKind;

    #[test]
    fn processing_failure_hides_provider_reason() {
        let err = ChatError::from(ProviderError::unavailable(ProviderKind::OpenAI, "HTTP 401 - bad key"));
        match ApiError::from(err) {
            ApiError::Internal { error, details } => {
                assert_eq!(error, "Failed to process chat message");
                assert_eq!(details.as_deref(), Some("Failed to process message"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_request_renders_400() {
        let resp = ApiError::BadRequest("Message is required".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
