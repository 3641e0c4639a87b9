//! # Aria - search-grounded conversational assistant
//!
//! Orchestrates one chat turn at a time: language detection, an optional
//! web search (SerpAPI, then Google Custom Search), prompt assembly, dispatch
//! to a configured cloud model, and link extraction from the reply.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aria::{agent::{ChatAgent, ConversationStore}, config::Config};
//! use tokio::sync::Mutex;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let agent = ChatAgent::from_config(&config)?;
//!     let history = Mutex::new(ConversationStore::new(config.conversation.max_history_length));
//!
//!     let response = agent.process_message(&history, "What is the latest Rust release?", None, None).await?;
//!     println!("{}", response.text);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod language;
pub mod models;
pub mod providers;
pub mod search;
pub mod server;
pub mod utils;

// Re-export commonly used types for convenience
pub use agent::{ChatAgent, ConversationStore, SessionStore};
pub use config::{CloudProviderConfig, Config};
pub use error::{ChatError, ProviderError, SearchError};
pub use models::{ChatResponse, LocationContext, ModelAdapter, ModelMetrics, PromptMessage, ProviderKind, Role, Turn};
pub use search::{SearchEvidence, WebSearch};
