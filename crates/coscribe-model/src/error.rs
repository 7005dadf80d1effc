// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// No key configured and the key variable is unset.
    #[error("Missing {env}")]
    MissingApiKey { env: String },
    /// The provider answered with a non-success status.
    #[error("{status} {message}")]
    Provider { status: u16, message: String },
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed provider response: {0}")]
    Decode(String),
}
