// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `SessionService`: the single writer over a [`Session`].
//!
//! ```text
//!   UI ──► mpsc::Sender<SessionCommand> ──► SessionService ──► broadcast<SessionEvent> ──► UI
//!                                               │    ▲
//!                           spawn backend call  │    │ completion_tx
//!                                               ▼    │
//!                                          Backend (model / search)
//!
//!   Replica::subscribe() ──► DocumentChange ──► SessionService
//! ```
//!
//! Commands are handled one at a time.  Backend calls never block the loop:
//! each runs in its own task and posts a [`Completion`] back, which the
//! loop folds into the session.  Replies that no longer match the
//! outstanding request are dropped by the session itself.

use std::sync::Arc;

use coscribe_document::DocumentChange;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    Backend, BackendError, ChatReply, EditAction, Outbound, Received, Session, SessionCommand,
    SessionEvent,
};

// ── Public API ────────────────────────────────────────────────────────────────

/// Cheap-to-clone handle to a running [`SessionService`].
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: SessionCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| anyhow::anyhow!("session service has shut down"))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}

/// Backend results posted back by spawned tasks.
#[derive(Debug)]
enum Completion {
    Chat { request_id: u64, reply: ChatReply },
    Edit { request_id: u64, reply: Result<String, BackendError> },
}

// ── Service ───────────────────────────────────────────────────────────────────

pub struct SessionService {
    session: Session,
    backend: Arc<dyn Backend>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    completion_rx: mpsc::Receiver<Completion>,
    completion_tx: mpsc::Sender<Completion>,
    changes: broadcast::Receiver<DocumentChange>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionService {
    /// Construct the service and a handle to it.  Subscribe through the
    /// handle before calling [`SessionService::run`] to see every event.
    pub fn new(session: Session, backend: Arc<dyn Backend>) -> (Self, SessionHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, _) = broadcast::channel(256);
        let (completion_tx, completion_rx) = mpsc::channel(16);
        let changes = session.document().subscribe();

        let handle = SessionHandle { cmd_tx, event_tx: event_tx.clone() };
        let svc = Self { session, backend, cmd_rx, completion_rx, completion_tx, changes, event_tx };
        (svc, handle)
    }

    /// Run until `EndSession` arrives or every handle is dropped.
    /// Returns the session so callers can inspect the final state.
    pub async fn run(mut self) -> Session {
        info!(replica = %self.session.document().replica_id(), "session started");
        let mut watching = true;
        loop {
            tokio::select! {
                // Document changes first: a command must see every change
                // that happened before it was sent.
                biased;
                change = self.changes.recv(), if watching => match change {
                    Ok(change) => self.session.note_change(&change),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "document change feed lagged");
                        self.session.changes_missed();
                    }
                    Err(broadcast::error::RecvError::Closed) => watching = false,
                },
                Some(done) = self.completion_rx.recv() => {
                    self.handle_completion(done);
                }
                msg = self.cmd_rx.recv() => {
                    let Some(cmd) = msg else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
            }
        }
        info!("session stopped");
        self.session
    }

    fn broadcast(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    fn reject(&self, reason: impl ToString) {
        let reason = reason.to_string();
        debug!(%reason, "command rejected");
        self.broadcast(SessionEvent::Rejected { reason });
    }

    /// Returns `false` when the session has ended.
    fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::SetSelection { range } => {
                if let Err(e) = self.session.set_selection(range) {
                    self.reject(e);
                }
            }
            SessionCommand::SendChat { text } => self.handle_send_chat(&text),
            SessionCommand::ClearChat => {
                let was_busy = self.session.chat.is_busy();
                self.session.chat.clear();
                self.broadcast(SessionEvent::ChatCleared);
                if was_busy {
                    self.broadcast(SessionEvent::BusyChanged { busy: false });
                }
            }
            SessionCommand::RequestEdit { action } => self.handle_request_edit(action),
            SessionCommand::ConfirmEdit => match self.session.confirm_edit() {
                Ok(change) => self.broadcast(SessionEvent::EditApplied { change }),
                Err(e) => self.reject(e),
            },
            SessionCommand::CancelEdit => match self.session.edit.cancel() {
                Ok(()) => self.broadcast(SessionEvent::EditCancelled),
                Err(e) => self.reject(e),
            },
            SessionCommand::InsertMessage { index } => match self.session.insert_message(index) {
                Ok(change) => self.broadcast(SessionEvent::TextInserted { change }),
                Err(e) => self.reject(e),
            },
            SessionCommand::EndSession => {
                self.session.end();
                self.broadcast(SessionEvent::SessionEnded);
                return false;
            }
        }
        true
    }

    fn handle_send_chat(&mut self, text: &str) {
        let ticket = match self.session.chat.submit(text) {
            Ok(t) => t,
            Err(e) => return self.reject(e),
        };
        if let Some(message) = self.session.chat.messages().last().cloned() {
            self.broadcast(SessionEvent::MessageAppended { message });
        }
        self.broadcast(SessionEvent::BusyChanged { busy: true });

        let backend = self.backend.clone();
        let done = self.completion_tx.clone();
        let request_id = ticket.request_id;
        tokio::spawn(async move {
            let reply = match ticket.outbound {
                Outbound::Search { query } => ChatReply::Search(backend.search(&query).await),
                Outbound::Complete(req) => ChatReply::Complete(backend.complete(req).await),
            };
            let _ = done.send(Completion::Chat { request_id, reply }).await;
        });
    }

    fn handle_request_edit(&mut self, action: EditAction) {
        let ticket = match self.session.request_edit(action.clone()) {
            Ok(t) => t,
            Err(e) => return self.reject(e),
        };
        self.broadcast(SessionEvent::SuggestionPending {
            request_id: ticket.request_id,
            action,
            range: ticket.range,
        });

        let backend = self.backend.clone();
        let done = self.completion_tx.clone();
        tokio::spawn(async move {
            let reply = backend.complete(ticket.request).await;
            let _ = done
                .send(Completion::Edit { request_id: ticket.request_id, reply })
                .await;
        });
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Chat { request_id, reply } => {
                let Some(message) = self.session.chat.complete(request_id, reply).cloned() else {
                    return;
                };
                self.broadcast(SessionEvent::MessageAppended { message });
                self.broadcast(SessionEvent::BusyChanged { busy: false });
            }
            Completion::Edit { request_id, reply } => {
                let event = match self.session.edit.receive(request_id, reply.map_err(|e| e.to_string())) {
                    Received::Ready(s) => SessionEvent::SuggestionReady {
                        request_id,
                        original: s.original.clone(),
                        suggestion: s.suggestion.clone(),
                        range: s.range,
                    },
                    Received::Failed(message) => {
                        warn!(%message, "edit suggestion failed");
                        SessionEvent::SuggestionFailed { message }
                    }
                    Received::Ignored => return,
                };
                self.broadcast(event);
            }
        }
    }
}
