// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

use crate::{DocumentChange, DocumentError};

/// Half-open span `start..end` in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

/// Outcome of moving a range across a concurrent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebase {
    /// The change lies after the range.
    Unchanged,
    /// The change lies before the range; the range moved.
    Shifted(TextRange),
    /// The change touched characters inside the range.
    Conflict,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Result<Self, DocumentError> {
        if start > end {
            return Err(DocumentError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Zero-width range at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check the range against a document of `len` characters.
    pub fn validate(&self, len: usize) -> Result<(), DocumentError> {
        if self.start > self.end {
            return Err(DocumentError::InvalidRange { start: self.start, end: self.end });
        }
        if self.end > len {
            return Err(DocumentError::OutOfBounds { pos: self.end, len });
        }
        Ok(())
    }

    /// Move this range across `change`, which was applied after the range
    /// was captured.
    ///
    /// An edit ending at or before `start` shifts the range by the edit's
    /// length delta; an edit starting at or after `end` leaves it alone.
    /// Anything else overlaps the captured text.
    pub fn rebase(&self, change: &DocumentChange) -> Rebase {
        let c = change.range;
        if c.end <= self.start {
            let removed = c.len();
            let inserted = change.inserted_len;
            if removed == inserted {
                return Rebase::Unchanged;
            }
            let start = self.start - removed + inserted;
            return Rebase::Shifted(TextRange { start, end: start + self.len() });
        }
        if c.start >= self.end {
            return Rebase::Unchanged;
        }
        Rebase::Conflict
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
