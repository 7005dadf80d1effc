// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{DocumentError, Presence, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaId(pub Uuid);

impl ReplicaId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One applied replacement, as seen by every replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    /// Replica that made the change.
    pub origin: ReplicaId,
    /// Replaced span, in coordinates before the change.
    pub range: TextRange,
    /// Number of characters inserted in place of `range`.
    pub inserted_len: usize,
    /// Document version after the change.
    pub version: u64,
}

impl DocumentChange {
    /// Span of the inserted text, in coordinates after the change.
    pub fn inserted_range(&self) -> TextRange {
        TextRange { start: self.range.start, end: self.range.start + self.inserted_len }
    }
}

/// What an editor may do with the replicated document.
///
/// All offsets are character offsets.  Implementations own convergence;
/// callers see a single sequenced text.
pub trait DocumentSurface: Send + Sync {
    fn replica_id(&self) -> ReplicaId;

    fn presence(&self) -> Presence;

    /// Full current text.
    fn text(&self) -> String;

    /// Length in characters.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic counter bumped on every change.
    fn version(&self) -> u64;

    fn read_range(&self, range: TextRange) -> Result<String, DocumentError>;

    fn replace_range(&self, range: TextRange, text: &str) -> Result<DocumentChange, DocumentError>;

    /// Receive every change applied after this call, including this
    /// replica's own (check [`DocumentChange::origin`]).
    fn subscribe(&self) -> broadcast::Receiver<DocumentChange>;
}
