// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{SearchError, SearchProvider, SearchResponse};

/// Pre-scripted search provider.  Each call pops the next outcome; an
/// exhausted queue answers with an empty result set for the query.
#[derive(Default)]
pub struct ScriptedSearchProvider {
    scripts: Mutex<VecDeque<Result<SearchResponse, SearchError>>>,
    /// Every query received, in order.
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedSearchProvider {
    pub fn new(scripts: Vec<Result<SearchResponse, SearchError>>) -> Self {
        Self { scripts: Mutex::new(scripts.into()), queries: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().ok().and_then(|q| q.last().cloned())
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        if let Ok(mut q) = self.queries.lock() {
            q.push(query.to_string());
        }
        let next = self.scripts.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(resp)) => Ok(resp.sanitized(usize::MAX)),
            Some(Err(e)) => Err(e),
            None => Ok(SearchResponse { query: query.to_string(), ..Default::default() }),
        }
    }
}
