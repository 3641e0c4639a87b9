use crate::models::{Role, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 10;
pub const DEFAULT_SESSION_ID: &str = "default";

/// Bounded, ordered conversation history (oldest first).
///
/// Holds at most `2 * max_history_length` turns. Truncation is a raw window
/// over turns, so a user/assistant pair can be split at the cut.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    max_history_length: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_LENGTH)
    }
}

impl ConversationStore {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_history_length,
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_history_length * 2
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));

        let capacity = self.capacity();
        if self.turns.len() > capacity {
            let excess = self.turns.len() - capacity;
            self.turns.drain(..excess);
            debug!("Dropped {} oldest turn(s) from history", excess);
        }
    }

    pub fn get_all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

pub type SharedConversation = Arc<Mutex<ConversationStore>>;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug)]
struct SessionEntry {
    conversation: SharedConversation,
    last_used: Instant,
}

/// Per-session histories, keyed by connection or client-chosen session id.
///
/// Owned by the transport layer; the orchestrator only ever sees the one
/// `ConversationStore` it is handed. At most `max_sessions` are kept; creating
/// one past the cap evicts the least recently used.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    max_history_length: usize,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_LENGTH)
    }
}

impl SessionStore {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_history_length,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Returns the session's history, creating an empty one on first use.
    pub async fn session(&self, id: &str) -> SharedConversation {
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_used = Instant::now();
            return entry.conversation.clone();
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                debug!("Evicted idle conversation session {}", oldest);
            }
        }

        debug!("Creating conversation session {}", id);
        let conversation = Arc::new(Mutex::new(ConversationStore::new(self.max_history_length)));
        sessions.insert(
            id.to_string(),
            SessionEntry {
                conversation: conversation.clone(),
                last_used: Instant::now(),
            },
        );
        conversation
    }

    /// Looks up an existing session without creating one.
    pub async fn get(&self, id: &str) -> Option<SharedConversation> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(id).map(|entry| {
            entry.last_used = Instant::now();
            entry.conversation.clone()
        })
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
