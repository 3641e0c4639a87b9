use crate::models::ChatResponse;
use crate::search::SearchEvidence;
use regex::Regex;

/// Turns raw model text into a `ChatResponse`, collecting links from the text
/// and from search evidence.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    url_pattern: Regex,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self {
            url_pattern: Regex::new(r"https?://[^\s]+").expect("URL pattern is valid"),
        }
    }

    /// Links keep first-seen order and are unique by exact string; no URL
    /// normalization is applied.
    pub fn normalize(&self, raw: &str, evidence: Option<&SearchEvidence>) -> ChatResponse {
        let mut links: Vec<String> = Vec::new();

        for found in self.url_pattern.find_iter(raw) {
            push_unique(&mut links, found.as_str());
        }

        if let Some(evidence) = evidence {
            for result in evidence.organic_results() {
                if !result.link.is_empty() {
                    push_unique(&mut links, &result.link);
                }
            }
        }

        ChatResponse {
            text: raw.to_string(),
            links,
        }
    }
}

fn push_unique(links: &mut Vec<String>, link: &str) {
    if !links.iter().any(|l| l == link) {
        links.push(link.to_string());
    }
}
