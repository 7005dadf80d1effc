// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;

use crate::{SearchError, SearchResponse};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run one query.  A successful response only carries results with a
    /// non-empty title and url.
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;
}
