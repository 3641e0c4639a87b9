pub mod core;
pub mod gate;
pub mod memory;
pub mod normalizer;
pub mod prompt;

pub use core::ChatAgent;
pub use gate::{AugmentationGate, KeywordGate};
pub use memory::{ConversationStore, SessionStore, SharedConversation, DEFAULT_SESSION_ID};
pub use normalizer::ResponseNormalizer;
pub use prompt::PromptBuilder;
