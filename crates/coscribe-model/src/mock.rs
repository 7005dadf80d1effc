// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;

use crate::{CompletionRequest, ModelError, ModelProvider};

/// Deterministic mock provider.  Echoes the last user message back as the
/// assistant response.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError> {
        let reply = req.last_user_text().unwrap_or("[no input]");
        Ok(format!("MOCK: {reply}"))
    }
}

/// A pre-scripted mock provider.  Each call to `complete` pops the next
/// scripted outcome from the front of the queue; an exhausted queue yields
/// an empty reply.
pub struct ScriptedMockProvider {
    scripts: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: AtomicUsize,
    /// The last `CompletionRequest` seen by this provider.
    pub last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl ScriptedMockProvider {
    pub fn new(scripts: Vec<Result<String, ModelError>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Provider that answers every call in order with the given texts.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Number of completed `complete` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        "scripted-mock"
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError> {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(req);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.scripts.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| Ok(String::new()))
    }
}
