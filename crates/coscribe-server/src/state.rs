// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use coscribe_config::Config;
use coscribe_model::ModelProvider;
use coscribe_search::SearchProvider;

/// Shared by every handler.
pub struct AppState {
    pub model: Arc<dyn ModelProvider>,
    pub search: Arc<dyn SearchProvider>,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self { model, search }
    }

    /// Build the providers named in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            model: Arc::from(coscribe_model::from_config(&config.model)?),
            search: Arc::from(coscribe_search::from_config(&config.search)?),
        })
    }
}
