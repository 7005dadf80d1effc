// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Web search gateway.
//!
//! Forwards a query to an external search API and hands back its result
//! set unchanged apart from dropping unusable entries.  No pagination,
//! caching or deduplication.

mod types;
mod error;
mod provider;
mod tavily;
mod mock;

pub use types::*;
pub use error::SearchError;
pub use provider::SearchProvider;
pub use tavily::TavilyProvider;
pub use mock::ScriptedSearchProvider;

use anyhow::bail;
use coscribe_config::SearchConfig;

/// Construct a boxed [`SearchProvider`] from configuration.
///
/// - `"tavily"` → [`TavilyProvider`]
/// - `"mock"` → [`ScriptedSearchProvider`] with no scripted responses
pub fn from_config(cfg: &SearchConfig) -> anyhow::Result<Box<dyn SearchProvider>> {
    match cfg.provider.as_str() {
        "tavily" => Ok(Box::new(TavilyProvider::from_config(cfg))),
        "mock" => Ok(Box::new(ScriptedSearchProvider::new(vec![]))),
        other => bail!("unknown search provider: {other}"),
    }
}
