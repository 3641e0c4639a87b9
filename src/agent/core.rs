use crate::agent::gate::{AugmentationGate, KeywordGate};
use crate::agent::memory::ConversationStore;
use crate::agent::normalizer::ResponseNormalizer;
use crate::agent::prompt::PromptBuilder;
use crate::config::Config;
use crate::error::ChatError;
use crate::language::{resolve_language, HeuristicLanguageDetector, LanguageDetector};
use crate::models::{ChatResponse, LocationContext, ModelMetrics, ProviderKind, Role};
use crate::providers::ModelDispatcher;
use crate::search::{SearchEvidence, WebSearch};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Per-turn orchestration: language, search grounding, prompt, dispatch,
/// normalization, history bookkeeping.
///
/// The agent holds no conversation state of its own. Callers hand it the
/// history for the session they are serving.
pub struct ChatAgent {
    detector: Arc<dyn LanguageDetector>,
    gate: Arc<dyn AugmentationGate>,
    search: Arc<WebSearch>,
    dispatcher: ModelDispatcher,
    provider: ProviderKind,
    prompt_builder: PromptBuilder,
    normalizer: ResponseNormalizer,
}

impl std::fmt::Debug for ChatAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAgent")
            .field("provider", &self.provider)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl ChatAgent {
    pub fn new(search: WebSearch, dispatcher: ModelDispatcher, provider: ProviderKind) -> Self {
        Self {
            detector: Arc::new(HeuristicLanguageDetector::new()),
            gate: Arc::new(KeywordGate::new()),
            search: Arc::new(search),
            dispatcher,
            provider,
            prompt_builder: PromptBuilder::new(),
            normalizer: ResponseNormalizer::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        info!("Initializing chat agent...");

        let search = WebSearch::from_config(&config.search)?;
        let dispatcher = ModelDispatcher::from_config(config);

        if dispatcher.adapter(config.provider).is_none() {
            anyhow::bail!("Selected provider {} has no adapter", config.provider);
        }

        info!("Agent ready - provider: {}", config.provider);
        Ok(Self::new(search, dispatcher, config.provider))
    }

    pub fn with_gate(mut self, gate: Arc<dyn AugmentationGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn web_search(&self) -> &WebSearch {
        &self.search
    }

    pub async fn metrics(&self) -> Option<ModelMetrics> {
        self.dispatcher.metrics(self.provider).await
    }

    /// Run one conversational turn against `history`.
    ///
    /// The user turn is recorded before any I/O and stays recorded if a later
    /// step fails. The history lock is only taken for append and snapshot.
    pub async fn process_message(
        &self,
        history: &Mutex<ConversationStore>,
        utterance: &str,
        language: Option<&str>,
        location: Option<&LocationContext>,
    ) -> Result<ChatResponse, ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let start = Instant::now();
        let language = resolve_language(self.detector.as_ref(), language, utterance);
        debug!("Processing message in {} via {}", language, self.provider);

        let snapshot = {
            let mut history = history.lock().await;
            history.append(Role::User, utterance);
            history.get_all().to_vec()
        };

        let mut prompt = self
            .prompt_builder
            .build(utterance, &language, location, &snapshot);

        let evidence: Option<SearchEvidence> = if self.gate.needs_search(utterance) {
            debug!("Search triggered for {:?}", utterance);
            let evidence = self.search.search(utterance, &language).await;
            prompt.push(self.prompt_builder.evidence_message(utterance, &evidence));
            Some(evidence)
        } else {
            None
        };

        let raw = match self.dispatcher.dispatch(self.provider, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Error processing message: {}", e);
                return Err(ChatError::from(e));
            }
        };

        let response = self.normalizer.normalize(&raw, evidence.as_ref());
        history
            .lock()
            .await
            .append(Role::Assistant, response.text.clone());

        debug!(
            "Message processed in {:?} ({} links)",
            start.elapsed(),
            response.links.len()
        );
        Ok(response)
    }
}
