use crate::models::{LocationContext, PromptMessage, Turn};
use crate::search::SearchEvidence;

/// Assembles the provider-agnostic message sequence for one model call.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Order: persona, optional location, history verbatim, then the utterance.
    pub fn build(
        &self,
        utterance: &str,
        language: &str,
        location: Option<&LocationContext>,
        history: &[Turn],
    ) -> Vec<PromptMessage> {
        let mut prompt = Vec::with_capacity(history.len() + 3);

        prompt.push(PromptMessage::system(format!(
            "You are a helpful multilingual assistant. Respond in the same language as the user's query. Current language: {}.",
            language
        )));

        if let Some(location) = location {
            prompt.push(PromptMessage::system(format!(
                "The user's location is: {}, {}. This appears to be in or near: {}.",
                location.latitude,
                location.longitude,
                location.address.as_deref().unwrap_or("Unknown location")
            )));
        }

        prompt.extend(history.iter().map(PromptMessage::from));
        prompt.push(PromptMessage::user(utterance));

        prompt
    }

    /// System message carrying search evidence; goes last, after the user message.
    pub fn evidence_message(&self, query: &str, evidence: &SearchEvidence) -> PromptMessage {
        let serialized = serde_json::to_string(evidence).unwrap_or_else(|_| "{}".to_string());
        PromptMessage::system(format!("Web search results for \"{}\": {}", query, serialized))
    }
}
