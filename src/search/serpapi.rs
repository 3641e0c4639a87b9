use super::{OrganicResult, SearchBackend, SearchQuery, SearchResults};
use crate::error::SearchError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    knowledge_graph: Option<Value>,
    answer_box: Option<Value>,
    // SerpAPI reports some failures (bad key, quota) as a 200 with `error`.
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SerpApiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SerpApiBackend {
    pub fn new(client: reqwest::Client, api_key: Option<String>, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResults, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::NotConfigured("missing SERPAPI_API_KEY".to_string()))?;

        let num = q.max_results.to_string();
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("api_key", api_key),
                ("q", q.query.as_str()),
                ("hl", q.language.as_str()),
                ("gl", q.region.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let parsed: SerpApiResponse = resp.json().await?;
        if let Some(error) = parsed.error {
            return Err(SearchError::Malformed(error));
        }

        Ok(SearchResults {
            query: q.query.clone(),
            organic_results: parsed.organic_results,
            knowledge_graph: parsed.knowledge_graph,
            answer_box: parsed.answer_box,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_serpapi_shape() {
        let js = r#"
        {
          "search_metadata": {"status": "Success"},
          "organic_results": [
            {"position": 1, "title": "Paris", "link": "https://en.wikipedia.org/wiki/Paris",
             "snippet": "Capital of France", "source": "Wikipedia", "displayed_link": "en.wikipedia.org"}
          ],
          "answer_box": {"answer": "Paris"}
        }
        "#;
        let parsed: SerpApiResponse = serde_json::from_str(js).unwrap();
        assert_eq!(parsed.organic_results.len(), 1);
        assert_eq!(parsed.organic_results[0].position, Some(1));
        assert_eq!(parsed.organic_results[0].source.as_deref(), Some("Wikipedia"));
        assert!(parsed.knowledge_graph.is_none());
        assert_eq!(parsed.answer_box.unwrap()["answer"], "Paris");
    }

    #[test]
    fn missing_organic_results_is_empty() {
        let parsed: SerpApiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic_results.is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let backend = SerpApiBackend::new(reqwest::Client::new(), None, "http://127.0.0.1:9".to_string());
        let q = SearchQuery {
            query: "rust".to_string(),
            language: "en".to_string(),
            region: "us".to_string(),
            max_results: 5,
        };
        assert!(matches!(backend.search(&q).await, Err(SearchError::NotConfigured(_))));
    }
}
