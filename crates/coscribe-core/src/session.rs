// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use coscribe_config::Config;
use coscribe_document::{DocumentChange, DocumentError, DocumentSurface, Rebase, TextRange};
use thiserror::Error;
use tracing::debug;

use crate::{ChatError, ChatPanel, EditAction, EditError, EditFlow, EditTicket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Everything one user's editing session holds: the chat transcript, the
/// edit-suggestion flow, the current selection and the replica it edits.
///
/// Created when the session starts; [`Session::end`] returns it to its
/// initial state.
pub struct Session {
    pub chat: ChatPanel,
    pub edit: EditFlow,
    document: Arc<dyn DocumentSurface>,
    actions: Vec<EditAction>,
    selection: TextRange,
    /// Document version the selection is expressed against.
    selection_version: u64,
}

impl Session {
    pub fn new(config: &Config, document: Arc<dyn DocumentSurface>) -> Self {
        let selection_version = document.version();
        Self {
            chat: ChatPanel::from_config(&config.chat),
            edit: EditFlow::from_config(&config.editor),
            actions: config.editor.actions.iter().map(|a| EditAction::new(a.as_str())).collect(),
            document,
            selection: TextRange::caret(0),
            selection_version,
        }
    }

    pub fn document(&self) -> &dyn DocumentSurface {
        self.document.as_ref()
    }

    /// Actions offered for a selection.
    pub fn actions(&self) -> &[EditAction] {
        &self.actions
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    pub fn set_selection(&mut self, range: TextRange) -> Result<(), DocumentError> {
        range.validate(self.document.len())?;
        self.selection = range;
        self.selection_version = self.document.version();
        Ok(())
    }

    pub fn selected_text(&self) -> Result<String, DocumentError> {
        self.document.read_range(self.selection)
    }

    /// Trigger `action` on the current selection.
    pub fn request_edit(&mut self, action: EditAction) -> Result<EditTicket, EditError> {
        self.edit.trigger(self.document.as_ref(), self.selection, action)
    }

    /// Apply the previewed suggestion; the selection then covers the new text.
    pub fn confirm_edit(&mut self) -> Result<DocumentChange, EditError> {
        let change = self.edit.confirm(self.document.as_ref())?;
        self.select_after(&change);
        Ok(change)
    }

    /// Put the assistant reply at visible `index` in place of the selection.
    pub fn insert_message(&mut self, index: usize) -> Result<DocumentChange, SessionError> {
        let text = self.chat.insertable(index)?.to_string();
        let change = self.document.replace_range(self.selection, &text)?;
        self.select_after(&change);
        Ok(change)
    }

    fn select_after(&mut self, change: &DocumentChange) {
        self.selection = TextRange::caret(change.inserted_range().end);
        self.selection_version = change.version;
    }

    /// Follow a change to the shared document.
    pub fn note_change(&mut self, change: &DocumentChange) {
        self.edit.note_change(change);

        if change.version <= self.selection_version {
            return;
        }
        self.selection_version = change.version;
        match self.selection.rebase(change) {
            Rebase::Unchanged => {}
            Rebase::Shifted(range) => self.selection = range,
            Rebase::Conflict => {
                debug!(selection = %self.selection, "selection edited remotely; collapsing");
                self.selection = TextRange::caret(change.range.start.min(self.document.len()));
            }
        }
    }

    /// Some document changes were never seen.  The selection cannot be
    /// rebased, so it collapses to a caret that is still in bounds, and a
    /// revalidated suggestion is invalidated.
    pub fn changes_missed(&mut self) {
        self.edit.invalidate();
        self.selection = TextRange::caret(self.selection.start.min(self.document.len()));
        self.selection_version = self.document.version();
    }

    /// End the session: transcript back to the preamble, nothing pending,
    /// empty selection.
    pub fn end(&mut self) {
        self.chat.clear();
        self.edit.reset();
        self.selection = TextRange::caret(0);
        self.selection_version = self.document.version();
    }
}
