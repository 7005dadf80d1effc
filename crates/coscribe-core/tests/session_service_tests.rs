// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! End-to-end tests of the session service over scripted gateways and an
//! in-process shared document.

use std::sync::Arc;
use std::time::Duration;

use coscribe_config::{ApplyPolicy, Config};
use coscribe_core::{
    DirectBackend, EditAction, Session, SessionCommand, SessionEvent, SessionHandle,
    SessionService,
};
use coscribe_document::{DocumentSurface, Presence, Replica, SharedDocument, TextRange};
use coscribe_model::{ChatMessage, ModelError, ScriptedMockProvider};
use coscribe_search::{ScriptedSearchProvider, SearchResponse, SearchResult};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

struct Harness {
    handle: SessionHandle,
    events: broadcast::Receiver<SessionEvent>,
    model: Arc<ScriptedMockProvider>,
    search: Arc<ScriptedSearchProvider>,
    doc: SharedDocument,
    task: JoinHandle<Session>,
}

fn start(
    text: &str,
    policy: ApplyPolicy,
    model: ScriptedMockProvider,
    search: ScriptedSearchProvider,
) -> Harness {
    let mut config = Config::default();
    config.editor.apply_policy = policy;

    let doc = SharedDocument::new("test-room", text);
    let replica: Arc<dyn DocumentSurface> = Arc::new(doc.join(Presence::new("me", "#0ea5e9")));
    let model = Arc::new(model);
    let search = Arc::new(search);
    let backend = Arc::new(DirectBackend::new(model.clone(), search.clone()));

    let (svc, handle) = SessionService::new(Session::new(&config, replica), backend);
    let events = handle.subscribe();
    let task = tokio::spawn(svc.run());
    Harness { handle, events, model, search, doc, task }
}

impl Harness {
    async fn send(&self, cmd: SessionCommand) {
        self.handle.send(cmd).await.unwrap();
    }

    /// Next event matching `pred`, skipping others.
    async fn expect(&mut self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        let fut = async {
            loop {
                let ev = self.events.recv().await.expect("event stream closed");
                if pred(&ev) {
                    return ev;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), fut)
            .await
            .expect("timed out waiting for event")
    }

    async fn assistant_reply(&mut self) -> String {
        match self
            .expect(|e| matches!(e, SessionEvent::MessageAppended { message } if message.role == coscribe_model::Role::Assistant))
            .await
        {
            SessionEvent::MessageAppended { message } => message.content,
            _ => unreachable!(),
        }
    }

    async fn end(self) -> Session {
        self.handle.send(SessionCommand::EndSession).await.unwrap();
        self.task.await.unwrap()
    }

    fn peer(&self) -> Replica {
        self.doc.join(Presence::new("peer", "#f97316"))
    }
}

fn no_search() -> ScriptedSearchProvider {
    ScriptedSearchProvider::default()
}

// ── Chat ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_round_trip_sends_transcript_and_appends_reply() {
    let mut h = start("", ApplyPolicy::Captured, ScriptedMockProvider::replies(["Hi there"]), no_search());

    h.send(SessionCommand::SendChat { text: "hello".into() }).await;

    let ev = h.expect(|e| matches!(e, SessionEvent::MessageAppended { .. })).await;
    assert_eq!(ev, SessionEvent::MessageAppended { message: ChatMessage::user("hello") });
    h.expect(|e| *e == SessionEvent::BusyChanged { busy: true }).await;
    assert_eq!(h.assistant_reply().await, "Hi there");
    h.expect(|e| *e == SessionEvent::BusyChanged { busy: false }).await;

    let req = h.model.last_request().unwrap();
    assert_eq!(req.messages.len(), 2, "preamble + user");
    assert_eq!(req.messages[0].content, coscribe_config::DEFAULT_CHAT_PREAMBLE);
    assert_eq!(h.search.calls(), 0);

    let session = h.end().await;
    assert_eq!(session.chat.messages().len(), 1, "end clears the transcript");
}

#[tokio::test]
async fn prefixed_input_goes_to_search_only() {
    let resp = SearchResponse {
        query: "site:openai.com changelog".into(),
        results: vec![SearchResult::new("X", "http://x", "y")],
        answer: None,
    };
    let mut h = start(
        "",
        ApplyPolicy::Captured,
        ScriptedMockProvider::replies(Vec::<String>::new()),
        ScriptedSearchProvider::new(vec![Ok(resp)]),
    );

    h.send(SessionCommand::SendChat { text: "/agent site:openai.com changelog".into() }).await;
    assert_eq!(h.assistant_reply().await, "Search results:\n\n- X\nhttp://x\ny");
    assert_eq!(h.search.last_query().as_deref(), Some("site:openai.com changelog"));
    assert_eq!(h.model.calls(), 0);
    h.end().await;
}

#[tokio::test]
async fn blank_input_makes_no_call() {
    let mut h = start("", ApplyPolicy::Captured, ScriptedMockProvider::replies(["x"]), no_search());
    h.send(SessionCommand::SendChat { text: "  \t ".into() }).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::Rejected { .. })).await;
    assert_eq!(ev, SessionEvent::Rejected { reason: "message is empty".into() });

    let session = h.end().await;
    assert_eq!(session.chat.messages().len(), 1);
}

#[tokio::test]
async fn model_failure_becomes_error_message() {
    let model = ScriptedMockProvider::new(vec![Err(ModelError::MissingApiKey {
        env: "OPENAI_API_KEY".into(),
    })]);
    let mut h = start("", ApplyPolicy::Captured, model, no_search());
    h.send(SessionCommand::SendChat { text: "hello".into() }).await;
    assert_eq!(h.assistant_reply().await, "Error: Missing OPENAI_API_KEY");
    h.end().await;
}

// ── Edit suggestions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_selection_makes_no_call() {
    let mut h = start("hello", ApplyPolicy::Captured, ScriptedMockProvider::replies(["x"]), no_search());
    h.send(SessionCommand::SetSelection { range: TextRange::caret(2) }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::Rejected { .. })).await;
    assert_eq!(h.model.calls(), 0);
    h.end().await;
}

#[tokio::test]
async fn confirm_applies_over_captured_range_despite_concurrent_edit() {
    let mut h = start(
        "hello brave world",
        ApplyPolicy::Captured,
        ScriptedMockProvider::replies(["bold"]),
        no_search(),
    );
    h.send(SessionCommand::SetSelection { range: TextRange { start: 6, end: 11 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;

    let pending = h.expect(|e| matches!(e, SessionEvent::SuggestionPending { .. })).await;
    let SessionEvent::SuggestionPending { request_id, .. } = pending else { unreachable!() };
    let ready = h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;
    assert_eq!(
        ready,
        SessionEvent::SuggestionReady {
            request_id,
            original: "brave".into(),
            suggestion: "bold".into(),
            range: TextRange { start: 6, end: 11 },
        }
    );
    let req = h.model.last_request().unwrap();
    assert_eq!(req.mode.as_deref(), Some("edit"));

    let peer = h.peer();
    peer.replace_range(TextRange::caret(0), ">> ").unwrap();

    h.send(SessionCommand::ConfirmEdit).await;
    h.expect(|e| matches!(e, SessionEvent::EditApplied { .. })).await;
    assert_eq!(h.doc.text(), ">> helboldave world");
    h.end().await;
}

#[tokio::test]
async fn revalidate_follows_earlier_remote_edit() {
    let mut h = start(
        "hello brave world",
        ApplyPolicy::Revalidate,
        ScriptedMockProvider::replies(["bold"]),
        no_search(),
    );
    h.send(SessionCommand::SetSelection { range: TextRange { start: 6, end: 11 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;

    let peer = h.peer();
    peer.replace_range(TextRange::caret(0), ">> ").unwrap();

    h.send(SessionCommand::ConfirmEdit).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::EditApplied { .. })).await;
    let SessionEvent::EditApplied { change } = ev else { unreachable!() };
    assert_eq!(change.range, TextRange { start: 9, end: 14 });
    assert_eq!(h.doc.text(), ">> hello bold world");
    h.end().await;
}

#[tokio::test]
async fn revalidate_lands_on_selection_rebased_over_concurrent_writers() {
    let mut h = start(
        "hello brave world",
        ApplyPolicy::Revalidate,
        ScriptedMockProvider::replies(["bold"]),
        no_search(),
    );
    h.send(SessionCommand::SetSelection { range: TextRange { start: 6, end: 11 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;

    let writers: Vec<Replica> = (0..4).map(|_| h.peer()).collect();
    std::thread::scope(|scope| {
        for replica in &writers {
            scope.spawn(move || {
                for _ in 0..50 {
                    replica.replace_range(TextRange::caret(0), "x").unwrap();
                }
            });
        }
    });

    h.send(SessionCommand::ConfirmEdit).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::EditApplied { .. })).await;
    let SessionEvent::EditApplied { change } = ev else { unreachable!() };
    assert_eq!(change.range, TextRange { start: 206, end: 211 });
    assert_eq!(change.version, 201);
    assert_eq!(h.doc.text(), format!("{}hello bold world", "x".repeat(200)));
    h.end().await;
}

#[tokio::test]
async fn revalidate_refuses_overlapping_remote_edit() {
    let mut h = start(
        "hello brave world",
        ApplyPolicy::Revalidate,
        ScriptedMockProvider::replies(["bold"]),
        no_search(),
    );
    h.send(SessionCommand::SetSelection { range: TextRange { start: 6, end: 11 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;

    let peer = h.peer();
    peer.replace_range(TextRange { start: 7, end: 8 }, "R").unwrap();

    h.send(SessionCommand::ConfirmEdit).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::Rejected { .. })).await;
    assert_eq!(
        ev,
        SessionEvent::Rejected { reason: "the selected text was changed by another editor".into() }
    );
    assert_eq!(h.doc.text(), "hello bRave world");
    h.end().await;
}

#[tokio::test]
async fn failed_suggestion_returns_to_browsing() {
    let model = ScriptedMockProvider::new(vec![
        Err(ModelError::Provider { status: 429, message: "Rate limit reached".into() }),
        Ok("Hi".into()),
    ]);
    let mut h = start("hello", ApplyPolicy::Captured, model, no_search());
    h.send(SessionCommand::SetSelection { range: TextRange { start: 0, end: 5 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::SuggestionFailed { .. })).await;
    assert_eq!(ev, SessionEvent::SuggestionFailed { message: "429 Rate limit reached".into() });

    // Browsing again: a second trigger is accepted.
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;
    h.end().await;
}

#[tokio::test]
async fn cancel_closes_preview_without_writing() {
    let mut h = start("hello", ApplyPolicy::Captured, ScriptedMockProvider::replies(["hi"]), no_search());
    h.send(SessionCommand::SetSelection { range: TextRange { start: 0, end: 5 } }).await;
    h.send(SessionCommand::RequestEdit { action: EditAction::new("Shorten") }).await;
    h.expect(|e| matches!(e, SessionEvent::SuggestionReady { .. })).await;
    h.send(SessionCommand::CancelEdit).await;
    h.expect(|e| *e == SessionEvent::EditCancelled).await;
    h.send(SessionCommand::ConfirmEdit).await;
    h.expect(|e| matches!(e, SessionEvent::Rejected { .. })).await;
    assert_eq!(h.doc.text(), "hello");
    h.end().await;
}

#[tokio::test]
async fn insert_message_writes_reply_at_selection() {
    let mut h = start("Title: ", ApplyPolicy::Captured, ScriptedMockProvider::replies(["Roadmap"]), no_search());
    h.send(SessionCommand::SendChat { text: "suggest a title".into() }).await;
    h.assistant_reply().await;
    h.send(SessionCommand::SetSelection { range: TextRange::caret(7) }).await;
    h.send(SessionCommand::InsertMessage { index: 1 }).await;
    h.expect(|e| matches!(e, SessionEvent::TextInserted { .. })).await;
    assert_eq!(h.doc.text(), "Title: Roadmap");
    h.end().await;
}

#[tokio::test]
async fn clear_resets_transcript_and_insert_indices() {
    let mut h = start("", ApplyPolicy::Captured, ScriptedMockProvider::replies(["first"]), no_search());
    h.send(SessionCommand::SendChat { text: "hello".into() }).await;
    h.assistant_reply().await;

    h.send(SessionCommand::ClearChat).await;
    h.expect(|e| *e == SessionEvent::ChatCleared).await;

    h.send(SessionCommand::InsertMessage { index: 1 }).await;
    let ev = h.expect(|e| matches!(e, SessionEvent::Rejected { .. })).await;
    assert!(matches!(ev, SessionEvent::Rejected { .. }));
    assert_eq!(h.doc.text(), "");

    let session = h.end().await;
    assert_eq!(session.chat.messages().len(), 1);
}
