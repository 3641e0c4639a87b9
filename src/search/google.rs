use super::{OrganicResult, SearchBackend, SearchQuery, SearchResults};
use crate::error::SearchError;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoogleCseResponse {
    items: Option<Vec<GoogleCseItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    display_link: Option<String>,
    rank: Option<u32>,
}

impl From<GoogleCseItem> for OrganicResult {
    fn from(item: GoogleCseItem) -> Self {
        OrganicResult {
            position: item.rank,
            title: item.title,
            link: item.link,
            snippet: item.snippet,
            source: item.display_link,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleCseBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    cse_id: Option<String>,
    base_url: String,
}

impl GoogleCseBackend {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        cse_id: Option<String>,
        base_url: String,
    ) -> Self {
        Self {
            client,
            api_key,
            cse_id,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/customsearch/v1", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchBackend for GoogleCseBackend {
    fn name(&self) -> &'static str {
        "google-cse"
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResults, SearchError> {
        let (Some(api_key), Some(cse_id)) = (self.api_key.as_deref(), self.cse_id.as_deref()) else {
            return Err(SearchError::NotConfigured(
                "missing GOOGLE_SEARCH_API_KEY or GOOGLE_CSE_ID".to_string(),
            ));
        };

        let num = q.max_results.to_string();
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("key", api_key),
                ("cx", cse_id),
                ("q", q.query.as_str()),
                ("hl", q.language.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let parsed: GoogleCseResponse = resp.json().await?;
        let items = parsed
            .items
            .ok_or_else(|| SearchError::Malformed("response has no items".to_string()))?;

        Ok(SearchResults {
            query: q.query.clone(),
            organic_results: items.into_iter().map(OrganicResult::from).collect(),
            knowledge_graph: None,
            answer_box: None,
        })
    }
}
