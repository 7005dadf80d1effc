// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT

/// Where a chat submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Web search with the text after the prefix as query.
    Search(&'a str),
    /// Chat completion over the running transcript.
    Chat,
}

/// Route raw input.  Blank input routes nowhere.
///
/// The prefix is matched against the input as typed; `" /agent x"` is a
/// chat message, not a search.
pub fn route<'a>(input: &'a str, search_prefix: &str) -> Option<Route<'a>> {
    if input.trim().is_empty() {
        return None;
    }
    match input.strip_prefix(search_prefix) {
        Some(query) if !search_prefix.is_empty() => Some(Route::Search(query)),
        _ => Some(Route::Chat),
    }
}
