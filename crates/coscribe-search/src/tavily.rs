// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use coscribe_config::SearchConfig;
use serde_json::json;
use tracing::{debug, warn};

use crate::{SearchError, SearchProvider, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily search API driver.
pub struct TavilyProvider {
    api_key: Option<String>,
    key_env: String,
    search_url: String,
    search_depth: String,
    include_answer: bool,
    max_results: usize,
    client: reqwest::Client,
}

impl TavilyProvider {
    pub fn from_config(cfg: &SearchConfig) -> Self {
        let base = cfg.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        Self {
            api_key: cfg.api_key.clone(),
            key_env: cfg.key_label().to_string(),
            search_url: format!("{base}/search"),
            search_depth: cfg.search_depth.clone(),
            include_answer: cfg.include_answer,
            max_results: cfg.max_results,
            client: reqwest::Client::new(),
        }
    }

    fn resolve_key(&self) -> Result<String, SearchError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.key_env).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SearchError::MissingApiKey { env: self.key_env.clone() })
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let key = self.resolve_key()?;

        debug!(query = %query, depth = %self.search_depth, max_results = self.max_results, "tavily search");

        let resp = self
            .client
            .post(&self.search_url)
            .bearer_auth(&key)
            .json(&json!({
                "query": query,
                "search_depth": self.search_depth,
                "include_answer": self.include_answer,
                "max_results": self.max_results,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "tavily returned an error");
            return Err(SearchError::Provider { status: status.as_u16(), body });
        }

        let mut data: SearchResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        if data.query.is_empty() {
            data.query = query.to_string();
        }
        Ok(data.sanitized(self.max_results))
    }
}
