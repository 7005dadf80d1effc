// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Every handler returns `Result<T, ApiError>`; the error becomes a
//! `{"error": "..."}` JSON body with a matching status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coscribe_model::ModelError;
use coscribe_search::SearchError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not the expected JSON: bad syntax, wrong shape
    /// or wrong content type.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unreadable `/api/chat` body.  That endpoint answers every failure
    /// with 500.
    #[error("{0}")]
    ChatBody(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl ApiError {
    pub fn chat_body(rejection: JsonRejection) -> Self {
        ApiError::ChatBody(rejection.body_text())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Search(e) if e.is_missing_credentials() => StatusCode::BAD_REQUEST,
            ApiError::ChatBody(_) | ApiError::Model(_) | ApiError::Search(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %message, "upstream request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
