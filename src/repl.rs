// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Line parser for `coscribe chat`.
//!
//! Supported syntax:
//!   /quit | /exit
//!   /clear
//!   /show
//!   /help
//!   /insert N
//!
//! Anything else, including the search prefix and unknown `/words`, is a
//! chat message and goes to the session unchanged.

pub const HELP: &str = "\
/insert N   append transcript entry N to the document
/show       print the document
/clear      start a new conversation
/quit       leave (also /exit or Ctrl-D)
Lines starting with the search prefix are sent to web search.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplLine {
    /// Nothing but whitespace.
    Empty,
    Quit,
    Clear,
    Show,
    Help,
    Insert(usize),
    /// A recognised command with bad arguments; holds the usage text.
    Usage(&'static str),
    /// Send to the chat panel as typed.
    Message(String),
}

pub fn parse(line: &str, search_prefix: &str) -> ReplLine {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return ReplLine::Empty;
    }
    if !search_prefix.is_empty() && line.starts_with(search_prefix) {
        return ReplLine::Message(line.to_string());
    }
    let Some(body) = line.trim().strip_prefix('/') else {
        return ReplLine::Message(line.to_string());
    };

    let mut tokens = body.split_whitespace();
    let command = tokens.next().unwrap_or_default();
    let args: Vec<&str> = tokens.collect();

    match (command, args.as_slice()) {
        ("quit" | "exit", []) => ReplLine::Quit,
        ("clear", []) => ReplLine::Clear,
        ("show", []) => ReplLine::Show,
        ("help", []) => ReplLine::Help,
        ("insert", [n]) => match n.parse() {
            Ok(index) => ReplLine::Insert(index),
            Err(_) => ReplLine::Usage("usage: /insert N"),
        },
        ("insert", _) => ReplLine::Usage("usage: /insert N"),
        _ => ReplLine::Message(line.to_string()),
    }
}
