// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use coscribe_config::EditorConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a replica appears to the other peers in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub name: String,
    pub color: String,
}

impl Presence {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { name: name.into(), color: color.into() }
    }

    /// `User-<n>` with `n` drawn from `0..1000`.
    pub fn anonymous(color: impl Into<String>) -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1000);
        Self::new(format!("User-{n}"), color)
    }

    pub fn from_config(cfg: &EditorConfig) -> Self {
        match cfg.user_name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => Self::new(name, cfg.user_color.clone()),
            None => Self::anonymous(cfg.user_color.clone()),
        }
    }
}
