// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Driver for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Requests are non-streaming: the whole reply is returned once the
//! provider answers.  The API key is resolved on every call so that a key
//! exported after startup is picked up without a restart.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{CompletionRequest, ModelError, ModelProvider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    model: String,
    /// Explicit key from config; takes precedence over `key_env`.
    api_key: Option<String>,
    /// Variable read when no explicit key is configured.
    key_env: String,
    chat_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        model: String,
        api_key: Option<String>,
        key_env: String,
        base_url: Option<String>,
        temperature: Option<f32>,
    ) -> Self {
        let base = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        Self {
            model,
            api_key,
            key_env,
            chat_url: format!("{base}/chat/completions"),
            temperature: temperature.unwrap_or(0.2),
            client: reqwest::Client::new(),
        }
    }

    fn resolve_key(&self) -> Result<String, ModelError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.key_env).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::MissingApiKey { env: self.key_env.clone() })
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError> {
        let key = self.resolve_key()?;

        let body = json!({
            "model": self.model,
            "messages": req.messages,
            "temperature": self.temperature,
        });

        debug!(
            driver = "openai",
            model = %self.model,
            message_count = req.messages.len(),
            mode = req.mode.as_deref().unwrap_or("chat"),
            "sending completion request"
        );

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::Provider {
                status: status.as_u16(),
                message: provider_message(&text),
            });
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        Ok(first_choice_text(&value))
    }
}

/// Text of `choices[0].message.content`, or `""` when the reply carries none.
pub(crate) fn first_choice_text(value: &Value) -> String {
    value["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Prefer the provider's `error.message` over the raw body.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_strips_trailing_slash() {
        let p = OpenAiProvider::new(
            "m".into(),
            None,
            "OPENAI_API_KEY".into(),
            Some("http://localhost:8080/v1/".into()),
            None,
        );
        assert_eq!(p.chat_url, "http://localhost:8080/v1/chat/completions");
        assert!((p.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_key_names_the_variable() {
        let p = OpenAiProvider::new(
            "m".into(),
            None,
            "COSCRIBE_TEST_UNSET_KEY_VAR".into(),
            None,
            None,
        );
        let err = p.resolve_key().unwrap_err();
        assert_eq!(err.to_string(), "Missing COSCRIBE_TEST_UNSET_KEY_VAR");
    }

    #[test]
    fn explicit_key_wins() {
        let p = OpenAiProvider::new(
            "m".into(),
            Some("sk-explicit".into()),
            "COSCRIBE_TEST_UNSET_KEY_VAR".into(),
            None,
            None,
        );
        assert_eq!(p.resolve_key().unwrap(), "sk-explicit");
    }

    #[test]
    fn first_choice_defaults_to_empty() {
        assert_eq!(first_choice_text(&json!({"choices": []})), "");
        assert_eq!(first_choice_text(&json!({})), "");
        assert_eq!(
            first_choice_text(&json!({"choices": [{"message": {"content": "hey"}}]})),
            "hey"
        );
    }

    #[test]
    fn provider_message_extracts_error_field() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(provider_message(body), "Incorrect API key provided");
        assert_eq!(provider_message("bad gateway\n"), "bad gateway");
    }
}
