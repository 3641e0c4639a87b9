pub mod cloud;

pub use cloud::{AnthropicAdapter, OpenAIAdapter, OpenRouterAdapter};

use crate::config::{CloudProviderConfig, Config};
use crate::error::ProviderError;
use crate::models::{ModelAdapter, ModelMetrics, PromptMessage, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Construct the adapter that matches a provider config entry.
pub fn build_adapter(config: &CloudProviderConfig) -> Result<Arc<dyn ModelAdapter>, ProviderError> {
    let adapter: Arc<dyn ModelAdapter> = match config.name {
        ProviderKind::OpenAI => Arc::new(OpenAIAdapter::new(config.clone())?),
        ProviderKind::Anthropic => Arc::new(AnthropicAdapter::new(config.clone())?),
        ProviderKind::Perplexity => Arc::new(OpenRouterAdapter::perplexity(config.clone())?),
        ProviderKind::OpenRouter => Arc::new(OpenRouterAdapter::new(config.clone())?),
    };
    Ok(adapter)
}

/// Routing table from provider identity to adapter. No cross-provider
/// fallback: an unknown identity is a hard failure.
#[derive(Default, Clone)]
pub struct ModelDispatcher {
    adapters: HashMap<ProviderKind, Arc<dyn ModelAdapter>>,
}

impl std::fmt::Debug for ModelDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.adapters.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ModelDispatcher").field("adapters", &kinds).finish()
    }
}

impl ModelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let mut dispatcher = Self::new();

        for provider in &config.providers {
            match build_adapter(provider) {
                Ok(adapter) => {
                    if adapter.is_available() {
                        info!("✅ {} adapter initialized ({})", provider.name, provider.model);
                    } else {
                        warn!("⚠️  {} adapter created but not available (missing API key)", provider.name);
                    }
                    dispatcher.register(adapter);
                }
                Err(e) => warn!("❌ Failed to initialize {} adapter: {}", provider.name, e),
            }
        }

        dispatcher
    }

    pub fn register(&mut self, adapter: Arc<dyn ModelAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn adapter(&self, provider: ProviderKind) -> Option<&Arc<dyn ModelAdapter>> {
        self.adapters.get(&provider)
    }

    pub async fn dispatch(
        &self,
        provider: ProviderKind,
        messages: &[PromptMessage],
    ) -> Result<String, ProviderError> {
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or(ProviderError::NotConfigured(provider))?;

        debug!("Dispatching {} prompt messages to {}", messages.len(), provider);
        adapter.complete(messages).await
    }

    pub async fn metrics(&self, provider: ProviderKind) -> Option<ModelMetrics> {
        match self.adapters.get(&provider) {
            Some(adapter) => Some(adapter.metrics().await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo(ProviderKind);

    #[async_trait]
    impl ModelAdapter for Echo {
        fn kind(&self) -> ProviderKind {
            self.0
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
            Ok(format!("{}:{}", self.0, messages.len()))
        }
    }

    #[tokio::test]
    async fn routes_by_identity() {
        let dispatcher = ModelDispatcher::new()
            .with_adapter(Arc::new(Echo(ProviderKind::OpenAI)))
            .with_adapter(Arc::new(Echo(ProviderKind::Anthropic)));

        let messages = vec![PromptMessage::user("hi")];
        assert_eq!(dispatcher.dispatch(ProviderKind::Anthropic, &messages).await.unwrap(), "anthropic:1");
        assert_eq!(dispatcher.dispatch(ProviderKind::OpenAI, &messages).await.unwrap(), "openai:1");
    }

    #[tokio::test]
    async fn unknown_identity_does_not_fall_back() {
        let dispatcher = ModelDispatcher::new().with_adapter(Arc::new(Echo(ProviderKind::OpenAI)));

        let err = dispatcher
            .dispatch(ProviderKind::Perplexity, &[PromptMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(ProviderKind::Perplexity)));
    }

    #[test]
    fn from_config_registers_every_adapter() {
        let dispatcher = ModelDispatcher::from_config(&Config::default());
        for kind in ProviderKind::ALL {
            let adapter = dispatcher.adapter(kind).unwrap();
            assert_eq!(adapter.kind(), kind);
            assert!(!adapter.is_available());
        }
    }
}
