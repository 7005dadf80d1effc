// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use coscribe_model::{ChatMessage, CompletionRequest};
use serde::{Deserialize, Serialize};

/// Mode hint attached to edit-suggestion requests.
pub const EDIT_MODE: &str = "edit";

/// A labelled transformation offered for a selection, e.g. "Shorten".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditAction(String);

impl EditAction {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// User instruction asking for this action on `original`.
    pub fn instruction(&self, original: &str) -> String {
        format!(
            "Please {} the following selection. Return ONLY the edited text.\n\n---\n{}",
            self.0.to_lowercase(),
            original
        )
    }

    /// Full request for an edit suggestion.
    pub fn request(&self, system_prompt: &str, original: &str) -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(self.instruction(original)),
        ])
        .with_mode(EDIT_MODE)
    }
}

impl std::fmt::Display for EditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EditAction {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
