// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

// ─── Server ───────────────────────────────────────────────────────────────────

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}

/// HTTP listener for the chat and search proxy routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind: String,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Answer CORS preflights from any origin.
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: 1024 * 1024,
            permissive_cors: true,
        }
    }
}

// ─── Model ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider identifier: "openai" | "mock"
    pub provider: String,
    /// Model name forwarded to the provider API
    pub name: String,
    /// Environment variable that overrides `name` when set
    pub name_env: Option<String>,
    /// Environment variable that holds the API key (read per request)
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files
    pub api_key: Option<String>,
    /// Base URL override, e.g. a local OpenAI-compatible server
    pub base_url: Option<String>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            name: "gpt-4o-mini".into(),
            name_env: Some("OPENAI_MODEL".into()),
            api_key_env: Some("OPENAI_API_KEY".into()),
            api_key: None,
            base_url: None,
            temperature: Some(0.2),
        }
    }
}

impl ModelConfig {
    /// Model name after applying the `name_env` override.
    pub fn resolved_name(&self) -> String {
        self.name_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Name of the key variable, used in "missing key" messages.
    pub fn key_label(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
    }
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Provider identifier: "tavily" | "mock"
    pub provider: String,
    /// Environment variable that holds the API key (read per request)
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// "basic" or "advanced"
    pub search_depth: String,
    /// Ask the provider for a synthesized answer
    pub include_answer: bool,
    /// Upper bound on returned results
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "tavily".into(),
            api_key_env: Some("TAVILY_API_KEY".into()),
            api_key: None,
            base_url: None,
            search_depth: "advanced".into(),
            include_answer: true,
            max_results: 5,
        }
    }
}

impl SearchConfig {
    pub fn key_label(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or("TAVILY_API_KEY")
    }
}

// ─── Chat panel ───────────────────────────────────────────────────────────────

pub const DEFAULT_CHAT_PREAMBLE: &str =
    "You are a helpful AI assistant inside a collaborative editor.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// System message that opens every transcript
    pub system_prompt: String,
    /// Inputs starting with this prefix are routed to web search
    pub search_prefix: String,
    /// Base URL of a running `coscribe serve` used by `coscribe chat --remote`
    pub endpoint: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_CHAT_PREAMBLE.into(),
            search_prefix: "/agent ".into(),
            endpoint: format!("http://{}", default_bind()),
        }
    }
}

// ─── Editor ───────────────────────────────────────────────────────────────────

pub const DEFAULT_EDIT_PROMPT: &str =
    "You edit text precisely. Return only the revised selection without backticks or extra notes.";

pub const DEFAULT_WELCOME_TEXT: &str = "Welcome to the Live Collaborative AI Editor\n\
Type with your teammates and let the AI help! Select some text to try the floating toolbar.";

/// How a confirmed edit suggestion is placed into the shared document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApplyPolicy {
    /// Replace the range captured when the action was triggered.
    #[default]
    Captured,
    /// Track remote edits while the suggestion is pending; shift the range
    /// past edits before it and refuse to apply over an overlapping edit.
    Revalidate,
}

impl std::fmt::Display for ApplyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyPolicy::Captured => write!(f, "captured"),
            ApplyPolicy::Revalidate => write!(f, "revalidate"),
        }
    }
}

fn default_actions() -> Vec<String> {
    ["Fix grammar", "Shorten", "Lengthen", "Convert to table"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Collaboration room joined by this replica
    pub room: String,
    /// Presence name; `None` picks `User-<n>`
    pub user_name: Option<String>,
    /// Presence cursor color
    pub user_color: String,
    /// Labels of the edit actions offered for a selection
    pub actions: Vec<String>,
    /// System message for edit-suggestion requests
    pub edit_system_prompt: String,
    pub apply_policy: ApplyPolicy,
    /// Content of a freshly created room
    pub initial_content: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            room: "demo-room".into(),
            user_name: None,
            user_color: "#0ea5e9".into(),
            actions: default_actions(),
            edit_system_prompt: DEFAULT_EDIT_PROMPT.into(),
            apply_policy: ApplyPolicy::Captured,
            initial_content: DEFAULT_WELCOME_TEXT.into(),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
