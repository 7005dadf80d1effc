// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use coscribe_model::{CompletionRequest, ModelError, ModelProvider};
use coscribe_search::{SearchError, SearchProvider, SearchResponse};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The gateway answered but refused the request; `message` is the
    /// text it gave.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// No usable answer: connection, protocol or decoding failure.
    #[error("{0}")]
    Transport(String),
}

/// The two proxy operations a session needs.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<String, BackendError>;

    async fn search(&self, query: &str) -> Result<SearchResponse, BackendError>;
}

impl From<ModelError> for BackendError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Transport(_) | ModelError::Decode(_) => Self::Transport(e.to_string()),
            ModelError::MissingApiKey { .. } | ModelError::Provider { .. } => {
                Self::Rejected { status: 500, message: e.to_string() }
            }
        }
    }
}

impl From<SearchError> for BackendError {
    fn from(e: SearchError) -> Self {
        let status = if e.is_missing_credentials() { 400 } else { 500 };
        match e {
            SearchError::Transport(_) | SearchError::Decode(_) => Self::Transport(e.to_string()),
            _ => Self::Rejected { status, message: e.to_string() },
        }
    }
}

/// Calls the gateways in-process.
#[derive(Clone)]
pub struct DirectBackend {
    model: Arc<dyn ModelProvider>,
    search: Arc<dyn SearchProvider>,
}

impl DirectBackend {
    pub fn new(model: Arc<dyn ModelProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self { model, search }
    }
}

#[async_trait]
impl Backend for DirectBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<String, BackendError> {
        self.model.complete(req).await.map_err(|e| {
            warn!(provider = self.model.name(), error = %e, "completion failed");
            e.into()
        })
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, BackendError> {
        self.search.search(query).await.map_err(|e| {
            warn!(provider = self.search.name(), error = %e, "search failed");
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coscribe_model::{ChatMessage, ScriptedMockProvider};
    use coscribe_search::ScriptedSearchProvider;

    #[tokio::test]
    async fn missing_model_key_is_a_rejection_with_gateway_text() {
        let model = Arc::new(ScriptedMockProvider::new(vec![Err(ModelError::MissingApiKey {
            env: "OPENAI_API_KEY".into(),
        })]));
        let backend = DirectBackend::new(model, Arc::new(ScriptedSearchProvider::default()));
        let err = backend
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected { status: 500, message: "Missing OPENAI_API_KEY".into() }
        );
    }

    #[tokio::test]
    async fn missing_search_key_maps_to_400() {
        let search = Arc::new(ScriptedSearchProvider::new(vec![Err(SearchError::MissingApiKey {
            env: "TAVILY_API_KEY".into(),
        })]));
        let backend = DirectBackend::new(Arc::new(ScriptedMockProvider::replies(Vec::<String>::new())), search);
        let err = backend.search("q").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected { status: 400, message: "TAVILY_API_KEY not set".into() }
        );
    }

    #[test]
    fn decode_failures_are_transport_errors() {
        let e: BackendError = ModelError::Decode("eof".into()).into();
        assert!(matches!(e, BackendError::Transport(_)));
    }
}
