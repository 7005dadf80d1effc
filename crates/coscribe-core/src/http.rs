// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! [`Backend`] that talks to a running `coscribe serve` over HTTP.

use async_trait::async_trait;
use coscribe_model::CompletionRequest;
use coscribe_search::SearchResponse;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;

use crate::{Backend, BackendError};

pub const CHAT_PATH: &str = "/api/chat";
pub const SEARCH_PATH: &str = "/api/agent/search";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ChatBody {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct SearchBody {
    data: SearchResponse,
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "backend request");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(err) => BackendError::Rejected { status: status.as_u16(), message: err.error },
                Err(_) => BackendError::Transport(format!("{status}: {}", text.trim())),
            });
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<String, BackendError> {
        let body = serde_json::to_value(&req).map_err(|e| BackendError::Transport(e.to_string()))?;
        let reply: ChatBody = self.post(CHAT_PATH, body).await?;
        Ok(reply.content.unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, BackendError> {
        let reply: SearchBody = self.post(SEARCH_PATH, json!({ "query": query })).await?;
        Ok(reply.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use coscribe_model::ChatMessage;
    use serde_json::Value;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn complete_posts_messages_and_mode() {
        let app = Router::new().route(
            CHAT_PATH,
            post(|Json(body): Json<Value>| async move {
                let n = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                Json(json!({ "content": format!("{n} messages, mode {}", body["mode"]) }))
            }),
        );
        let backend = HttpBackend::new(serve(app).await);
        let reply = backend
            .complete(
                CompletionRequest::new(vec![ChatMessage::system("s"), ChatMessage::user("u")])
                    .with_mode("edit"),
            )
            .await
            .unwrap();
        assert_eq!(reply, "2 messages, mode \"edit\"");
    }

    #[tokio::test]
    async fn error_body_becomes_rejection() {
        let app = Router::new().route(
            SEARCH_PATH,
            post(|| async {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "TAVILY_API_KEY not set" })))
            }),
        );
        let backend = HttpBackend::new(serve(app).await);
        let err = backend.search("q").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected { status: 400, message: "TAVILY_API_KEY not set".into() }
        );
    }

    #[tokio::test]
    async fn search_unwraps_data() {
        let app = Router::new().route(
            SEARCH_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "data": {
                    "query": body["query"],
                    "results": [{"title": "X", "url": "http://x", "content": "y"}]
                }}))
            }),
        );
        let backend = HttpBackend::new(serve(app).await);
        let data = backend.search("rust").await.unwrap();
        assert_eq!(data.query, "rust");
        assert_eq!(data.results.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpBackend::new(format!("http://{addr}"));
        let err = backend.search("q").await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
