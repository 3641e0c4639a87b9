//! Web search used to ground replies.
//!
//! `WebSearch` tries a primary backend (SerpAPI) and falls back once to a
//! secondary backend (Google Custom Search). Callers always get a
//! `SearchEvidence`; a double failure becomes the error variant instead of an
//! `Err`.

pub mod google;
pub mod serpapi;

pub use google::GoogleCseBackend;
pub use serpapi::SerpApiBackend;

use crate::config::SearchConfig;
use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_MAX_RESULTS: usize = 5;
const SEARCH_FAILED: &str = "Failed to perform web search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub organic_results: Vec<OrganicResult>,
    pub knowledge_graph: Option<Value>,
    pub answer_box: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub error: String,
    pub results: Vec<OrganicResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchEvidence {
    Found(SearchResults),
    Failed(SearchFailure),
}

impl SearchEvidence {
    pub fn failed(error: impl Into<String>) -> Self {
        SearchEvidence::Failed(SearchFailure {
            error: error.into(),
            results: Vec::new(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchEvidence::Failed(_))
    }

    /// Organic results, empty for the error variant.
    pub fn organic_results(&self) -> &[OrganicResult] {
        match self {
            SearchEvidence::Found(found) => &found.organic_results,
            SearchEvidence::Failed(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub language: String,
    /// Country hint used only to bias result locality.
    pub region: String,
    pub max_results: usize,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError>;
}

/// Static language → country table; unmapped languages default to `us`.
pub fn region_for_language(language: &str) -> &'static str {
    match language {
        "en" => "us",
        "es" => "es",
        "fr" => "fr",
        "de" => "de",
        "it" => "it",
        "pt" => "pt",
        "zh" => "cn",
        "ja" => "jp",
        "ru" => "ru",
        _ => "us",
    }
}

pub(crate) fn search_client(timeout_seconds: u64) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("aria/0.1")
        .build()
        .map_err(SearchError::from)
}

pub struct WebSearch {
    primary: Arc<dyn SearchBackend>,
    fallback: Arc<dyn SearchBackend>,
    max_results: usize,
}

impl WebSearch {
    pub fn new(primary: Arc<dyn SearchBackend>, fallback: Arc<dyn SearchBackend>) -> Self {
        Self {
            primary,
            fallback,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = search_client(config.timeout_seconds)?;
        let primary = SerpApiBackend::new(
            client.clone(),
            config.serpapi_key.clone(),
            config.serpapi_base_url.clone(),
        );
        let fallback = GoogleCseBackend::new(
            client,
            config.google_api_key.clone(),
            config.google_cse_id.clone(),
            config.google_base_url.clone(),
        );

        Ok(Self {
            primary: Arc::new(primary),
            fallback: Arc::new(fallback),
            max_results: config.max_results.clamp(1, DEFAULT_MAX_RESULTS),
        })
    }

    pub async fn search(&self, query: &str, language: &str) -> SearchEvidence {
        let request = SearchQuery {
            query: query.to_string(),
            language: language.to_string(),
            region: region_for_language(language).to_string(),
            max_results: self.max_results,
        };

        debug!("Searching {} for {:?} ({})", self.primary.name(), query, language);
        let outcome = match self.primary.search(&request).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!("Primary search ({}) failed: {}", self.primary.name(), e);
                self.fallback.search(&request).await.map_err(|fallback_err| {
                    error!("Fallback search ({}) failed: {}", self.fallback.name(), fallback_err);
                    fallback_err
                })
            }
        };

        match outcome {
            Ok(mut results) => {
                results.organic_results.truncate(self.max_results);
                SearchEvidence::Found(results)
            }
            Err(_) => SearchEvidence::failed(SEARCH_FAILED),
        }
    }
}
