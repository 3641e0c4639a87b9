#![allow(dead_code)]

use std::net::SocketAddr;

use aria::config::{CloudProviderConfig, SearchConfig};
use aria::models::ProviderKind;
use axum::Router;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn provider_config(kind: ProviderKind, base_url: &str) -> CloudProviderConfig {
    let mut config = CloudProviderConfig::default_for(kind);
    config.api_key = Some("test-key".to_string());
    config.base_url = base_url.to_string();
    config.timeout_seconds = 5;
    config
}

pub fn search_config(base_url: &str) -> SearchConfig {
    SearchConfig {
        serpapi_key: Some("serp-key".to_string()),
        serpapi_base_url: base_url.to_string(),
        google_api_key: Some("google-key".to_string()),
        google_cse_id: Some("cse-id".to_string()),
        google_base_url: base_url.to_string(),
        max_results: 5,
        timeout_seconds: 5,
    }
}
