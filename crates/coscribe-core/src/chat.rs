// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The chat panel: an append-only transcript and a two-state
//! idle / awaiting-response machine.

use coscribe_model::{ChatMessage, CompletionRequest, Role};
use coscribe_search::SearchResponse;
use thiserror::Error;
use tracing::debug;

use crate::{format, route, BackendError, Route};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,
    #[error("still waiting for the previous response")]
    Busy,
    #[error("no message at index {0}")]
    NoSuchMessage(usize),
    #[error("message {0} is not an assistant reply")]
    NotAssistant(usize),
}

/// Network call a submission needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Search { query: String },
    Complete(CompletionRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTicket {
    pub request_id: u64,
    pub outbound: Outbound,
}

/// What came back for a ticket.
#[derive(Debug, Clone)]
pub enum ChatReply {
    Search(Result<SearchResponse, BackendError>),
    Complete(Result<String, BackendError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Search(u64),
    Complete(u64),
}

impl Pending {
    fn id(self) -> u64 {
        match self {
            Pending::Search(id) | Pending::Complete(id) => id,
        }
    }
}

pub struct ChatPanel {
    transcript: Vec<ChatMessage>,
    preamble: String,
    search_prefix: String,
    pending: Option<Pending>,
    next_id: u64,
}

impl ChatPanel {
    pub fn new(preamble: impl Into<String>, search_prefix: impl Into<String>) -> Self {
        let preamble = preamble.into();
        Self {
            transcript: vec![ChatMessage::system(preamble.clone())],
            preamble,
            search_prefix: search_prefix.into(),
            pending: None,
            next_id: 1,
        }
    }

    pub fn from_config(cfg: &coscribe_config::ChatConfig) -> Self {
        Self::new(cfg.system_prompt.clone(), cfg.search_prefix.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Full transcript, preamble included.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Messages shown to the user: everything but system entries.
    pub fn visible(&self) -> Vec<&ChatMessage> {
        self.transcript.iter().filter(|m| m.role != Role::System).collect()
    }

    /// Accept user input and say which call to make.
    ///
    /// Blank input and input arriving while a response is outstanding are
    /// refused without touching the transcript.
    pub fn submit(&mut self, input: &str) -> Result<ChatTicket, ChatError> {
        let route = route(input, &self.search_prefix).ok_or(ChatError::EmptyInput)?;
        if self.pending.is_some() {
            return Err(ChatError::Busy);
        }

        self.transcript.push(ChatMessage::user(input));
        let request_id = self.next_id;
        self.next_id += 1;

        let outbound = match route {
            Route::Search(query) => {
                self.pending = Some(Pending::Search(request_id));
                Outbound::Search { query: query.to_string() }
            }
            Route::Chat => {
                self.pending = Some(Pending::Complete(request_id));
                Outbound::Complete(CompletionRequest::new(self.transcript.clone()))
            }
        };
        debug!(request_id, search = matches!(outbound, Outbound::Search { .. }), "chat submitted");
        Ok(ChatTicket { request_id, outbound })
    }

    /// Record the reply to `request_id` as an assistant message and return
    /// to idle.  Replies to anything but the outstanding request are
    /// dropped and `None` is returned.
    pub fn complete(&mut self, request_id: u64, reply: ChatReply) -> Option<&ChatMessage> {
        match self.pending {
            Some(p) if p.id() == request_id => {}
            _ => {
                debug!(request_id, "dropping stale chat reply");
                return None;
            }
        }
        self.pending = None;

        let content = match reply {
            ChatReply::Search(Ok(resp)) => format::search_reply(&resp),
            ChatReply::Search(Err(BackendError::Rejected { message, .. })) => {
                format::agent_error(&message)
            }
            ChatReply::Complete(Ok(text)) => format::chat_reply(&text),
            ChatReply::Complete(Err(e)) | ChatReply::Search(Err(e)) => {
                format::error_reply(&e.to_string())
            }
        };
        self.transcript.push(ChatMessage::assistant(content));
        self.transcript.last()
    }

    /// Content of the assistant reply at `index` in [`Self::visible`].
    pub fn insertable(&self, index: usize) -> Result<&str, ChatError> {
        let msg = self
            .visible()
            .get(index)
            .copied()
            .ok_or(ChatError::NoSuchMessage(index))?;
        if msg.role != Role::Assistant {
            return Err(ChatError::NotAssistant(index));
        }
        Ok(&msg.content)
    }

    /// Back to just the preamble.  Outstanding replies are dropped.
    pub fn clear(&mut self) {
        self.transcript = vec![ChatMessage::system(self.preamble.clone())];
        self.pending = None;
    }
}
