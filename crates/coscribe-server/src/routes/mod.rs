// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod chat;
mod health;
mod search;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

/// All routes, without middleware.
pub fn api() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(search::router())
}
