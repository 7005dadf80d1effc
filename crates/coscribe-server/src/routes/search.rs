// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::routing::post;
use axum::{Json, Router};
use coscribe_search::SearchResponse;
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/agent/search", post(post_search))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub data: SearchResponse,
}

pub async fn post_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let Json(req) = body?;
    let data = state.search.search(&req.query).await?;
    Ok(Json(SearchEnvelope { data }))
}
