// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A range end lies past the end of the document.
    #[error("position {pos} out of bounds for document with length {len}")]
    OutOfBounds { pos: usize, len: usize },

    #[error("invalid range {start}..{end}: start is after end")]
    InvalidRange { start: usize, end: usize },
}
