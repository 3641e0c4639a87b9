//! WebSocket chat channel.
//!
//! Each connection gets its own conversation session, dropped when the
//! socket closes. Bad envelopes are answered with an error frame; the channel
//! stays open.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{ChatAgent, ConversationStore};
use crate::models::LocationContext;

use super::state::AppState;

const WS_ERROR_MESSAGE: &str = "Error processing your request";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    location: Option<LocationContext>,
}

fn error_frame() -> Value {
    json!({ "type": "error", "message": WS_ERROR_MESSAGE })
}

/// Answer one inbound text frame. Always returns a frame to send back.
pub async fn handle_envelope(agent: &ChatAgent, history: &Mutex<ConversationStore>, text: &str) -> Value {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed WebSocket message: {}", e);
            return error_frame();
        }
    };

    if envelope.kind != "chat" {
        warn!("Unsupported WebSocket message type: {}", envelope.kind);
        return error_frame();
    }

    let Some(message) = envelope.message else {
        return error_frame();
    };

    match agent
        .process_message(
            history,
            &message,
            envelope.language.as_deref(),
            envelope.location.as_ref(),
        )
        .await
    {
        Ok(response) => json!({ "type": "chat_response", "data": response }),
        Err(e) => {
            warn!("WebSocket chat failed: {}", e);
            error_frame()
        }
    }
}

/// GET /ws
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    let history = state.sessions.session(&session_id).await;
    info!("WebSocket client connected ({})", session_id);

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!("WebSocket receive error: {}", e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let reply = handle_envelope(&state.agent, &history, text.as_str()).await;
                if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.remove(&session_id).await;
    info!("WebSocket client disconnected ({})", session_id);
}
