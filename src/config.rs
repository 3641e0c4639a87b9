use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::ProviderKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which adapter every chat request is dispatched to.
    pub provider: ProviderKind,
    pub providers: Vec<CloudProviderConfig>,
    pub search: SearchConfig,
    pub conversation: ConversationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudProviderConfig {
    pub name: ProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl CloudProviderConfig {
    pub fn default_for(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAI => Self {
                name: kind,
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                max_tokens: Some(1000),
                temperature: Some(0.7),
                timeout_seconds: default_timeout_seconds(),
            },
            ProviderKind::Anthropic => Self {
                name: kind,
                api_key: None,
                base_url: "https://api.anthropic.com".to_string(),
                model: "claude-3-opus-20240229".to_string(),
                max_tokens: Some(1000),
                temperature: None,
                timeout_seconds: default_timeout_seconds(),
            },
            ProviderKind::Perplexity => Self {
                name: kind,
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "perplexity/sonar-deep-research".to_string(),
                max_tokens: Some(1000),
                temperature: Some(0.7),
                timeout_seconds: default_timeout_seconds(),
            },
            ProviderKind::OpenRouter => Self {
                name: kind,
                api_key: None,
                base_url: "https://openrouter.ai/api/v1".to_string(),
                model: "perplexity/sonar".to_string(),
                max_tokens: None,
                temperature: None,
                timeout_seconds: default_timeout_seconds(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub serpapi_key: Option<String>,
    pub serpapi_base_url: String,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub google_base_url: String,
    pub max_results: usize,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            serpapi_base_url: "https://serpapi.com".to_string(),
            google_api_key: None,
            google_cse_id: None,
            google_base_url: "https://www.googleapis.com".to_string(),
            max_results: 5,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Window size in exchanges; the store keeps twice this many turns.
    pub max_history_length: usize,
    /// Server-side cap on live sessions; the least recently used is evicted.
    pub max_sessions: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_length: 10,
            max_sessions: crate::agent::memory::DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try the working directory first, then the app data dir
        let mut candidates = vec![std::env::current_dir()?.join("config.toml")];
        if let Ok(data_dir) = crate::utils::paths::get_aria_data_dir() {
            candidates.push(data_dir.join("config.toml"));
        }

        let mut config = match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.ensure_all_providers();
        Ok(config)
    }

    /// Override secrets and selection from the environment. Blank values
    /// count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        for provider in &mut self.providers {
            let key = match provider.name {
                ProviderKind::OpenAI => var("OPENAI_API_KEY"),
                ProviderKind::Anthropic => var("ANTHROPIC_API_KEY"),
                ProviderKind::Perplexity => var("PERPLEXITY_KEY"),
                ProviderKind::OpenRouter => {
                    var("OPENROUTER_API_KEY").or_else(|| var("PERPLEXITY_KEY"))
                }
            };
            if key.is_some() {
                provider.api_key = key;
            }
        }

        if let Some(key) = var("SERPAPI_API_KEY") {
            self.search.serpapi_key = Some(key);
        }
        if let Some(key) = var("GOOGLE_SEARCH_API_KEY") {
            self.search.google_api_key = Some(key);
        }
        if let Some(cx) = var("GOOGLE_CSE_ID") {
            self.search.google_cse_id = Some(cx);
        }

        if let Some(selected) = var("LLM_PROVIDER") {
            match selected.parse::<ProviderKind>() {
                Ok(kind) => self.provider = kind,
                Err(e) => tracing::warn!("Ignoring LLM_PROVIDER: {}", e),
            }
        }

        if let Some(port) = var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    pub fn provider_config(&self, kind: ProviderKind) -> Option<&CloudProviderConfig> {
        self.providers.iter().find(|p| p.name == kind)
    }

    /// Fill in defaults for any provider the config file left out.
    fn ensure_all_providers(&mut self) {
        for kind in ProviderKind::ALL {
            if self.provider_config(kind).is_none() {
                self.providers.push(CloudProviderConfig::default_for(kind));
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Perplexity,
            providers: ProviderKind::ALL
                .iter()
                .map(|kind| CloudProviderConfig::default_for(*kind))
                .collect(),
            search: SearchConfig::default(),
            conversation: ConversationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_select_perplexity_with_all_adapters() {
        let config = Config::default();
        assert_eq!(config.conversation.max_sessions, 1024);
        assert_eq!(config.provider, ProviderKind::Perplexity);
        assert_eq!(config.providers.len(), 4);
        assert_eq!(config.conversation.max_history_length, 10);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.server.port, 5000);

        let anthropic = config.provider_config(ProviderKind::Anthropic).unwrap();
        assert_eq!(anthropic.model, "claude-3-opus-20240229");
        assert_eq!(anthropic.temperature, None);
    }

    #[test]
    fn env_overrides_keys_and_selection() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("PERPLEXITY_KEY", "pplx"),
            ("SERPAPI_API_KEY", "serp"),
            ("LLM_PROVIDER", "OpenAI"),
            ("PORT", "8080"),
        ]));

        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(
            config.provider_config(ProviderKind::OpenAI).unwrap().api_key.as_deref(),
            Some("sk-openai")
        );
        // OpenRouter shares the Perplexity key when no dedicated one is set
        assert_eq!(
            config.provider_config(ProviderKind::OpenRouter).unwrap().api_key.as_deref(),
            Some("pplx")
        );
        assert_eq!(config.search.serpapi_key.as_deref(), Some("serp"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn blank_and_invalid_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("ANTHROPIC_API_KEY", "   "),
            ("LLM_PROVIDER", "nonsense"),
            ("PORT", "not-a-port"),
        ]));

        assert!(config.provider_config(ProviderKind::Anthropic).unwrap().api_key.is_none());
        assert_eq!(config.provider, ProviderKind::Perplexity);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
provider = "openrouter"

[[providers]]
name = "openrouter"
base_url = "http://localhost:9999/v1"
model = "qwen/qwen3-0.6b-04-28:free"

[conversation]
max_history_length = 3
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenRouter);
        assert_eq!(config.conversation.max_history_length, 3);
        assert_eq!(config.providers.len(), 4);

        let openrouter = config.provider_config(ProviderKind::OpenRouter).unwrap();
        assert_eq!(openrouter.model, "qwen/qwen3-0.6b-04-28:free");
        assert_eq!(openrouter.timeout_seconds, 30);
        assert_eq!(config.search.serpapi_base_url, "https://serpapi.com");
    }
}
