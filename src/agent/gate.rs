/// Decides whether an utterance should be grounded with web search first.
pub trait AugmentationGate: Send + Sync {
    fn needs_search(&self, utterance: &str) -> bool;
}

pub const SEARCH_TRIGGERS: &[&str] = &[
    "search",
    "find",
    "look up",
    "what is",
    "who is",
    "where is",
    "how to",
    "when did",
    "why does",
    "latest",
    "news about",
    "information on",
    "tell me about",
    "search for",
];

/// Case-insensitive substring match against a fixed phrase list.
#[derive(Debug, Clone)]
pub struct KeywordGate {
    triggers: Vec<String>,
}

impl Default for KeywordGate {
    fn default() -> Self {
        Self::with_triggers(SEARCH_TRIGGERS.iter().copied())
    }
}

impl KeywordGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_triggers<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            triggers: triggers.into_iter().map(|t| t.as_ref().to_lowercase()).collect(),
        }
    }
}

impl AugmentationGate for KeywordGate {
    fn needs_search(&self, utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        self.triggers.iter().any(|t| lower.contains(t.as_str()))
    }
}
