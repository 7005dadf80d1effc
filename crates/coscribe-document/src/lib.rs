// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The shared document behind a small capability interface.
//!
//! Editors only ever read a range, replace a range, and watch for changes.
//! [`SharedDocument`] is an in-process room that sequences every
//! replacement and fans the resulting [`DocumentChange`] out to all of its
//! [`Replica`] handles.

mod error;
mod range;
mod presence;
mod surface;
mod shared;

pub use error::DocumentError;
pub use range::{Rebase, TextRange};
pub use presence::Presence;
pub use surface::{DocumentChange, DocumentSurface, ReplicaId};
pub use shared::{Replica, SharedDocument};
