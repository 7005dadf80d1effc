// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HTTP surface: the chat-completion proxy (`POST /api/chat`), the web
//! search proxy (`POST /api/agent/search`) and a health check.
//!
//! Both proxies make exactly one upstream call per request.  Failures are
//! returned as `{"error": "..."}` bodies.

mod error;
mod routes;
mod server;
mod state;

pub use error::ApiError;
pub use server::{router, serve, shutdown_signal};
pub use state::AppState;
