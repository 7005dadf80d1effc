// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Edit-suggestion flow.
//!
//! ```text
//!   Browsing ──trigger──► Pending ──receive(ok)──► Previewing ──confirm──► Browsing
//!      ▲                    │  └──receive(err)──► Browsing        │
//!      └──────cancel────────┴─────────────────────────cancel──────┘
//! ```
//!
//! The selection is read when the action is triggered.  With
//! [`ApplyPolicy::Captured`] confirm writes over exactly that range even if
//! other replicas edited the document in the meantime.  With
//! [`ApplyPolicy::Revalidate`] every change observed while a suggestion is
//! outstanding is rebased onto the captured range; an overlapping change
//! turns confirm into [`EditError::Conflict`].

use coscribe_config::ApplyPolicy;
use coscribe_document::{DocumentChange, DocumentError, DocumentSurface, Rebase, TextRange};
use coscribe_model::CompletionRequest;
use thiserror::Error;
use tracing::{debug, info};

use crate::EditAction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("nothing is selected")]
    EmptySelection,
    #[error("an edit suggestion is already in progress")]
    Busy,
    #[error("no edit suggestion is open")]
    NoSuggestion,
    #[error("the suggestion is empty")]
    EmptySuggestion,
    #[error("the selected text was changed by another editor")]
    Conflict,
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A suggestion waiting for confirm or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSuggestion {
    pub action: EditAction,
    /// Selection text as captured at trigger time.
    pub original: String,
    pub suggestion: String,
    /// Where the suggestion will be written.
    pub range: TextRange,
}

/// Request to send for a triggered action.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTicket {
    pub request_id: u64,
    pub range: TextRange,
    pub request: CompletionRequest,
}

/// Result of feeding a reply into the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received<'a> {
    Ready(&'a EditSuggestion),
    Failed(String),
    /// Not the outstanding request (cancelled or superseded).
    Ignored,
}

#[derive(Debug, Clone)]
struct Capture {
    request_id: u64,
    action: EditAction,
    original: String,
    range: TextRange,
    /// Changes at or below this version were already in the captured text.
    base_version: u64,
    conflicted: bool,
}

#[derive(Debug, Clone)]
enum State {
    Browsing,
    Pending(Capture),
    Previewing(Capture, EditSuggestion),
}

pub struct EditFlow {
    policy: ApplyPolicy,
    system_prompt: String,
    state: State,
    next_id: u64,
}

impl EditFlow {
    pub fn new(policy: ApplyPolicy, system_prompt: impl Into<String>) -> Self {
        Self { policy, system_prompt: system_prompt.into(), state: State::Browsing, next_id: 1 }
    }

    pub fn from_config(cfg: &coscribe_config::EditorConfig) -> Self {
        Self::new(cfg.apply_policy, cfg.edit_system_prompt.clone())
    }

    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self.state, State::Browsing)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    /// The open preview, if any.
    pub fn suggestion(&self) -> Option<&EditSuggestion> {
        match &self.state {
            State::Previewing(_, s) => Some(s),
            _ => None,
        }
    }

    /// Range the suggestion currently targets.
    pub fn target(&self) -> Option<TextRange> {
        match &self.state {
            State::Pending(c) | State::Previewing(c, _) => Some(c.range),
            State::Browsing => None,
        }
    }

    /// Whether an overlapping edit has invalidated the outstanding suggestion.
    pub fn is_conflicted(&self) -> bool {
        match &self.state {
            State::Pending(c) | State::Previewing(c, _) => c.conflicted,
            State::Browsing => false,
        }
    }

    /// Capture `selection` and build the suggestion request for `action`.
    ///
    /// An empty selection makes no request and opens nothing.
    pub fn trigger(
        &mut self,
        doc: &dyn DocumentSurface,
        selection: TextRange,
        action: EditAction,
    ) -> Result<EditTicket, EditError> {
        if !self.is_browsing() {
            return Err(EditError::Busy);
        }
        if selection.is_empty() {
            return Err(EditError::EmptySelection);
        }
        let original = doc.read_range(selection)?;
        if original.is_empty() {
            return Err(EditError::EmptySelection);
        }

        let request_id = self.next_id;
        self.next_id += 1;
        let request = action.request(&self.system_prompt, &original);
        debug!(request_id, action = %action, range = %selection, "edit suggestion requested");

        self.state = State::Pending(Capture {
            request_id,
            action,
            original,
            range: selection,
            base_version: doc.version(),
            conflicted: false,
        });
        Ok(EditTicket { request_id, range: selection, request })
    }

    /// Feed the reply for `request_id`.  Success opens the preview; failure
    /// returns to browsing with the error text.
    pub fn receive(&mut self, request_id: u64, reply: Result<String, String>) -> Received<'_> {
        let capture = match &self.state {
            State::Pending(c) if c.request_id == request_id => c.clone(),
            _ => {
                debug!(request_id, "dropping stale edit suggestion");
                return Received::Ignored;
            }
        };

        match reply {
            Ok(text) => {
                let suggestion = EditSuggestion {
                    action: capture.action.clone(),
                    original: capture.original.clone(),
                    suggestion: text,
                    range: capture.range,
                };
                self.state = State::Previewing(capture, suggestion);
                match &self.state {
                    State::Previewing(_, s) => Received::Ready(s),
                    _ => Received::Ignored,
                }
            }
            Err(message) => {
                self.state = State::Browsing;
                Received::Failed(message)
            }
        }
    }

    /// Track a document change while a suggestion is outstanding.
    ///
    /// Only the `Revalidate` policy looks at changes.
    pub fn note_change(&mut self, change: &DocumentChange) {
        if self.policy != ApplyPolicy::Revalidate {
            return;
        }
        let capture = match &mut self.state {
            State::Pending(c) | State::Previewing(c, _) => c,
            State::Browsing => return,
        };
        if change.version <= capture.base_version || capture.conflicted {
            return;
        }
        capture.base_version = change.version;
        match capture.range.rebase(change) {
            Rebase::Unchanged => {}
            Rebase::Shifted(range) => {
                debug!(from = %capture.range, to = %range, "suggestion target shifted");
                capture.range = range;
            }
            Rebase::Conflict => {
                info!(range = %capture.range, by = %change.origin, "suggestion target edited concurrently");
                capture.conflicted = true;
            }
        }
        if let State::Previewing(c, s) = &mut self.state {
            s.range = c.range;
        }
    }

    /// Changes were missed, so the target can no longer be rebased.
    ///
    /// Under `Revalidate` the outstanding suggestion becomes conflicted;
    /// `Captured` never tracked changes and is unaffected.
    pub fn invalidate(&mut self) {
        if self.policy != ApplyPolicy::Revalidate {
            return;
        }
        if let State::Pending(c) | State::Previewing(c, _) = &mut self.state {
            info!(range = %c.range, "document changes missed; suggestion target invalidated");
            c.conflicted = true;
        }
    }

    /// Write the previewed suggestion into the document.
    ///
    /// An empty suggestion is refused and the preview stays open.  A
    /// conflicted suggestion closes the preview without writing.
    pub fn confirm(&mut self, doc: &dyn DocumentSurface) -> Result<DocumentChange, EditError> {
        let (capture, suggestion) = match &self.state {
            State::Previewing(c, s) => (c, s),
            _ => return Err(EditError::NoSuggestion),
        };
        if suggestion.suggestion.is_empty() {
            return Err(EditError::EmptySuggestion);
        }
        if capture.conflicted {
            self.state = State::Browsing;
            return Err(EditError::Conflict);
        }

        let range = capture.range;
        let text = suggestion.suggestion.clone();
        self.state = State::Browsing;
        let change = doc.replace_range(range, &text)?;
        info!(range = %range, version = change.version, "edit suggestion applied");
        Ok(change)
    }

    /// Abandon the pending request or open preview.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        if self.is_browsing() {
            return Err(EditError::NoSuggestion);
        }
        self.state = State::Browsing;
        debug!("edit suggestion cancelled");
        Ok(())
    }

    /// Drop whatever is outstanding.
    pub fn reset(&mut self) {
        self.state = State::Browsing;
    }
}
