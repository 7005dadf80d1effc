// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Messages into and out of the session service.
//!
//! ```text
//! UI                                 SessionService
//!  │── SetSelection {range} ───────────►│
//!  │── RequestEdit {action} ───────────►│  SuggestionPending
//!  │                                    │  ... backend call ...
//!  │◄─ SuggestionReady {suggestion} ────│
//!  │── ConfirmEdit ────────────────────►│  EditApplied
//!  │                                    │
//!  │── SendChat {text} ────────────────►│  MessageAppended(user), BusyChanged(true)
//!  │◄─ MessageAppended(assistant) ──────│  BusyChanged(false)
//! ```

use coscribe_document::{DocumentChange, TextRange};
use coscribe_model::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::EditAction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    SetSelection { range: TextRange },
    SendChat { text: String },
    /// Drop the transcript back to the preamble.
    ClearChat,
    RequestEdit { action: EditAction },
    ConfirmEdit,
    CancelEdit,
    /// Insert the assistant reply at this index of the visible transcript.
    InsertMessage { index: usize },
    EndSession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { message: ChatMessage },
    BusyChanged { busy: bool },
    ChatCleared,
    SuggestionPending { request_id: u64, action: EditAction, range: TextRange },
    SuggestionReady { request_id: u64, original: String, suggestion: String, range: TextRange },
    /// The suggestion request failed; the flow is back to browsing.
    SuggestionFailed { message: String },
    EditApplied { change: DocumentChange },
    EditCancelled,
    TextInserted { change: DocumentChange },
    /// A command was refused; state is unchanged unless stated otherwise.
    Rejected { reason: String },
    SessionEnded,
}
