// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod types;
mod error;
mod provider;
mod openai;
mod mock;

pub use types::*;
pub use error::ModelError;
pub use provider::ModelProvider;
pub use openai::OpenAiProvider;
pub use mock::{MockProvider, ScriptedMockProvider};

use anyhow::bail;
use coscribe_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Provider selection:
/// - `"openai"` → [`OpenAiProvider`]
/// - `"mock"` → [`MockProvider`] (echo-back)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    match cfg.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(
            cfg.resolved_name(),
            cfg.api_key.clone(),
            cfg.key_label().to_string(),
            cfg.base_url.clone(),
            cfg.temperature,
        ))),
        "mock" => Ok(Box::new(MockProvider)),
        other => bail!("unknown model provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_known_providers() {
        let openai = from_config(&ModelConfig::default()).unwrap();
        assert_eq!(openai.name(), "openai");

        let mock = from_config(&ModelConfig { provider: "mock".into(), ..ModelConfig::default() })
            .unwrap();
        assert_eq!(mock.name(), "mock");
    }

    #[test]
    fn from_config_rejects_unknown_provider() {
        let cfg = ModelConfig { provider: "carrier-pigeon".into(), ..ModelConfig::default() };
        let err = from_config(&cfg).err().expect("unknown provider must fail");
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
