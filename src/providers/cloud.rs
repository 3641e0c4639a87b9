use crate::config::CloudProviderConfig;
use crate::error::ProviderError;
use crate::models::{ModelAdapter, ModelMetrics, PromptMessage, ProviderKind, Role};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

const OPENROUTER_REFERER: &str = "http://localhost";
const OPENROUTER_TITLE: &str = "Aria";

fn build_client(config: &CloudProviderConfig) -> Result<Client, ProviderError> {
    if config.api_key.is_none() {
        warn!("{} API key not provided, provider will be unavailable", config.name);
    }

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| ProviderError::unavailable(config.name, format!("client build failed: {}", e)))
}

fn api_key(config: &CloudProviderConfig) -> Result<&str, ProviderError> {
    config
        .api_key
        .as_deref()
        .ok_or_else(|| ProviderError::unavailable(config.name, "API key not configured"))
}

/// OpenAI-style chat completions body; optional knobs are only sent when set.
fn chat_completions_payload(config: &CloudProviderConfig, messages: &[PromptMessage]) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), json!(config.model));
    payload.insert("messages".to_string(), json!(messages));
    if let Some(temperature) = config.temperature {
        payload.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = config.max_tokens {
        payload.insert("max_tokens".to_string(), json!(max_tokens));
    }
    Value::Object(payload)
}

/// Anthropic keeps the system prompt out of the turn list: the first system
/// message becomes the top-level `system` field and every other system
/// message is dropped.
pub(crate) fn anthropic_payload(config: &CloudProviderConfig, messages: &[PromptMessage]) -> Value {
    let system = messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or("");

    let turns: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    let mut payload = Map::new();
    payload.insert("model".to_string(), json!(config.model));
    payload.insert("system".to_string(), json!(system));
    payload.insert("messages".to_string(), Value::Array(turns));
    payload.insert("max_tokens".to_string(), json!(config.max_tokens.unwrap_or(1000)));
    if let Some(temperature) = config.temperature {
        payload.insert("temperature".to_string(), json!(temperature));
    }
    Value::Object(payload)
}

fn choice_text(kind: ProviderKind, body: &Value) -> Result<String, ProviderError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::unavailable(kind, "missing choices[0].message.content"))
}

fn anthropic_text(body: &Value) -> Result<String, ProviderError> {
    body["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::unavailable(ProviderKind::Anthropic, "missing content[0].text")
        })
}

async fn send_json(kind: ProviderKind, request: RequestBuilder) -> Result<Value, ProviderError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ProviderError::unavailable(kind, format!("request failed: {}", e)))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::unavailable(kind, format!("HTTP {} - {}", status, body)));
    }

    resp.json::<Value>()
        .await
        .map_err(|e| ProviderError::unavailable(kind, format!("malformed response: {}", e)))
}

async fn record(
    metrics: &Mutex<ModelMetrics>,
    start: Instant,
    result: Result<String, ProviderError>,
) -> Result<String, ProviderError> {
    let mut metrics = metrics.lock().await;
    match &result {
        Ok(_) => metrics.record_success(start.elapsed().as_millis() as u64),
        Err(e) => {
            error!("{}", e);
            metrics.record_failure(e.to_string());
        }
    }
    result
}

pub struct OpenAIAdapter {
    config: CloudProviderConfig,
    client: Client,
    metrics: Arc<Mutex<ModelMetrics>>,
}

impl OpenAIAdapter {
    pub fn new(config: CloudProviderConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self {
            config,
            client,
            metrics: Arc::new(Mutex::new(ModelMetrics::default())),
        })
    }

    async fn call(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        let api_key = api_key(&self.config)?;
        let request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&chat_completions_payload(&self.config, messages));

        let body = send_json(ProviderKind::OpenAI, request).await?;
        choice_text(ProviderKind::OpenAI, &body)
    }
}

#[async_trait]
impl ModelAdapter for OpenAIAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        debug!("Sending {} messages to OpenAI ({})", messages.len(), self.config.model);
        let start = Instant::now();
        let result = self.call(messages).await;
        record(&self.metrics, start, result).await
    }

    async fn metrics(&self) -> ModelMetrics {
        self.metrics.lock().await.clone()
    }
}

pub struct AnthropicAdapter {
    config: CloudProviderConfig,
    client: Client,
    metrics: Arc<Mutex<ModelMetrics>>,
}

impl AnthropicAdapter {
    pub fn new(config: CloudProviderConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self {
            config,
            client,
            metrics: Arc::new(Mutex::new(ModelMetrics::default())),
        })
    }

    async fn call(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        let api_key = api_key(&self.config)?;
        let request = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&anthropic_payload(&self.config, messages));

        let body = send_json(ProviderKind::Anthropic, request).await?;
        anthropic_text(&body)
    }
}

#[async_trait]
impl ModelAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        debug!("Sending {} messages to Anthropic ({})", messages.len(), self.config.model);
        let start = Instant::now();
        let result = self.call(messages).await;
        record(&self.metrics, start, result).await
    }

    async fn metrics(&self) -> ModelMetrics {
        self.metrics.lock().await.clone()
    }
}

/// Chat-completions adapter routed through OpenRouter. Used both for the
/// Perplexity deep-research model and for arbitrary OpenRouter models.
pub struct OpenRouterAdapter {
    kind: ProviderKind,
    config: CloudProviderConfig,
    client: Client,
    metrics: Arc<Mutex<ModelMetrics>>,
}

impl OpenRouterAdapter {
    pub fn new(config: CloudProviderConfig) -> Result<Self, ProviderError> {
        Self::with_kind(ProviderKind::OpenRouter, config)
    }

    pub fn perplexity(config: CloudProviderConfig) -> Result<Self, ProviderError> {
        Self::with_kind(ProviderKind::Perplexity, config)
    }

    fn with_kind(kind: ProviderKind, config: CloudProviderConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self {
            kind,
            config,
            client,
            metrics: Arc::new(Mutex::new(ModelMetrics::default())),
        })
    }

    async fn call(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        let api_key = api_key(&self.config)?;
        let request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("HTTP-Referer", OPENROUTER_REFERER)
            .header("X-Title", OPENROUTER_TITLE)
            .header("Content-Type", "application/json")
            .json(&chat_completions_payload(&self.config, messages));

        let body = send_json(self.kind, request).await?;
        choice_text(self.kind, &body)
    }
}

#[async_trait]
impl ModelAdapter for OpenRouterAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, ProviderError> {
        debug!("Sending {} messages to OpenRouter ({})", messages.len(), self.config.model);
        let start = Instant::now();
        let result = self.call(messages).await;
        record(&self.metrics, start, result).await
    }

    async fn metrics(&self) -> ModelMetrics {
        self.metrics.lock().await.clone()
    }
}
