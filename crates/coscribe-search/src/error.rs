// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{env} not set")]
    MissingApiKey { env: String },
    /// Non-success status; `body` is the provider's raw response text.
    #[error("Tavily error: {body}")]
    Provider { status: u16, body: String },
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed search response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Whether the fault lies with the caller's configuration rather than
    /// the provider.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, SearchError::MissingApiKey { .. })
    }
}
