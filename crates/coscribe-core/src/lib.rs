// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Session logic for the collaborative editor: the chat panel, the
//! edit-suggestion flow and the service loop that drives both.

pub mod format;
mod prompts;
mod route;
mod backend;
mod http;
mod chat;
mod edit;
mod session;
mod protocol;
mod service;

pub use prompts::{EditAction, EDIT_MODE};
pub use route::{route, Route};
pub use backend::{Backend, BackendError, DirectBackend};
pub use http::{HttpBackend, CHAT_PATH, SEARCH_PATH};
pub use chat::{ChatError, ChatPanel, ChatReply, ChatTicket, Outbound};
pub use edit::{EditError, EditFlow, EditSuggestion, EditTicket, Received};
pub use session::{Session, SessionError};
pub use protocol::{SessionCommand, SessionEvent};
pub use service::{SessionHandle, SessionService};
