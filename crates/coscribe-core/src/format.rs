// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Rendering of gateway outcomes as assistant messages.

use coscribe_search::SearchResponse;

/// Shown when a chat completion comes back empty.
pub const NO_RESPONSE: &str = "(no response)";

/// A synthesized answer verbatim, otherwise the result list.
pub fn search_reply(resp: &SearchResponse) -> String {
    if let Some(answer) = resp.answer_text() {
        return answer.to_string();
    }
    let merged = resp
        .results
        .iter()
        .map(|r| format!("- {}\n{}\n{}", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Search results:\n\n{merged}")
}

/// A search the gateway refused.
pub fn agent_error(message: &str) -> String {
    let message = if message.trim().is_empty() { "unknown" } else { message };
    format!("Agent error: {message}")
}

pub fn chat_reply(content: &str) -> String {
    if content.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        content.to_string()
    }
}

/// Any other failure.
pub fn error_reply(message: &str) -> String {
    format!("Error: {message}")
}
