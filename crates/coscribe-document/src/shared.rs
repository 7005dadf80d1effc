// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{DocumentChange, DocumentError, DocumentSurface, Presence, ReplicaId, TextRange};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

struct DocState {
    text: String,
    version: u64,
    peers: Vec<(ReplicaId, Presence)>,
}

struct Room {
    name: String,
    state: Mutex<DocState>,
    changes: broadcast::Sender<DocumentChange>,
}

impl Room {
    fn lock(&self) -> MutexGuard<'_, DocState> {
        // The text is swapped in one assignment; a poisoned state is whole.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-process room that every replica edits through.
///
/// Cloning is cheap and yields another handle on the same room.
#[derive(Clone)]
pub struct SharedDocument {
    room: Arc<Room>,
}

impl SharedDocument {
    pub fn new(room: impl Into<String>, initial: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            room: Arc::new(Room {
                name: room.into(),
                state: Mutex::new(DocState { text: initial.into(), version: 0, peers: Vec::new() }),
                changes,
            }),
        }
    }

    pub fn room(&self) -> &str {
        &self.room.name
    }

    /// Join the room as a new peer.
    pub fn join(&self, presence: Presence) -> Replica {
        let id = ReplicaId::new();
        debug!(room = %self.room.name, replica = %id, name = %presence.name, "replica joined");
        self.room.lock().peers.push((id, presence.clone()));
        Replica { id, presence, room: self.room.clone() }
    }

    /// Presence of every replica currently in the room.
    pub fn peers(&self) -> Vec<Presence> {
        self.room.lock().peers.iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn text(&self) -> String {
        self.room.lock().text.clone()
    }
}

/// One peer's handle onto a [`SharedDocument`].  Leaves the room on drop.
pub struct Replica {
    id: ReplicaId,
    presence: Presence,
    room: Arc<Room>,
}

impl Replica {
    pub fn room(&self) -> &str {
        &self.room.name
    }
}

impl Drop for Replica {
    fn drop(&mut self) {
        self.room.lock().peers.retain(|(id, _)| *id != self.id);
    }
}

fn byte_offset(text: &str, char_pos: usize) -> usize {
    text.char_indices().nth(char_pos).map(|(b, _)| b).unwrap_or(text.len())
}

impl DocumentSurface for Replica {
    fn replica_id(&self) -> ReplicaId {
        self.id
    }

    fn presence(&self) -> Presence {
        self.presence.clone()
    }

    fn text(&self) -> String {
        self.room.lock().text.clone()
    }

    fn len(&self) -> usize {
        self.room.lock().text.chars().count()
    }

    fn version(&self) -> u64 {
        self.room.lock().version
    }

    fn read_range(&self, range: TextRange) -> Result<String, DocumentError> {
        let state = self.room.lock();
        range.validate(state.text.chars().count())?;
        Ok(state.text.chars().skip(range.start).take(range.len()).collect())
    }

    fn replace_range(&self, range: TextRange, text: &str) -> Result<DocumentChange, DocumentError> {
        let change = {
            let mut state = self.room.lock();
            range.validate(state.text.chars().count())?;

            let from = byte_offset(&state.text, range.start);
            let to = byte_offset(&state.text, range.end);
            let mut next = String::with_capacity(state.text.len() - (to - from) + text.len());
            next.push_str(&state.text[..from]);
            next.push_str(text);
            next.push_str(&state.text[to..]);
            state.text = next;
            state.version += 1;

            let change = DocumentChange {
                origin: self.id,
                range,
                inserted_len: text.chars().count(),
                version: state.version,
            };
            // Sent under the lock so subscribers see versions in order.
            // No subscribers is fine.
            let _ = self.room.changes.send(change.clone());
            change
        };

        trace!(replica = %self.id, range = %range, inserted = change.inserted_len, version = change.version, "document changed");
        Ok(change)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.room.changes.subscribe()
    }
}
