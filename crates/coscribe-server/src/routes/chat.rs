// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::routing::post;
use axum::{Json, Router};
use coscribe_model::CompletionRequest;
use serde::Serialize;
use tracing::debug;

use crate::{ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat", post(post_chat))
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
}

/// Forward `{messages, mode?}` to the model; a missing `messages` is an
/// empty list.  Every failure, an unreadable body included, is a 500.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body.map_err(ApiError::chat_body)?;
    debug!(
        messages = req.messages.len(),
        mode = req.mode.as_deref().unwrap_or("chat"),
        "chat request"
    );
    let content = state.model.complete(req).await?;
    Ok(Json(ChatResponse { content }))
}
