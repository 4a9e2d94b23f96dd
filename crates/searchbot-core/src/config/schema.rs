//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentSettings`, `ProvidersConfig`, `SearchConfig`,
//! `ChatConfig`, `WebConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper bound for the per-source result count (the UI slider range is 1–5).
pub const MAX_RESULTS_LIMIT: u32 = 5;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.searchbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentSettings,
    pub providers: ProvidersConfig,
    pub search: SearchConfig,
    pub chat: ChatConfig,
    pub web: WebConfig,
    /// Extra environment variables that must be present before chatting.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_env: Vec<String>,
}

impl Config {
    /// The provider config selected by `agent.provider`, if the name is known.
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        self.providers.get_by_name(&self.agent.provider)
    }

    /// Whether `model` is one of the models offered for selection.
    pub fn is_known_model(&self, model: &str) -> bool {
        self.agent.models.iter().any(|m| m == model)
    }
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// How much guidance the system prompt gives the model.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Research-assistant prompt with explicit guidelines.
    #[default]
    Guided,
    /// One-line role plus the current configuration.
    Minimal,
}

/// Agent settings: which model to call and how the tool loop behaves.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Provider name from the registry (e.g. `"groq"`).
    pub provider: String,
    /// Default model identifier.
    pub model: String,
    /// Models offered in the model picker.
    pub models: Vec<String>,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Maximum tool-calling loop iterations before forcing an answer.
    pub max_iterations: u32,
    pub prompt_style: PromptStyle,
    /// Send earlier chat turns to the model along with the new question.
    pub include_history: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "deepseek-r1-distill-llama-70b".to_string(),
            models: vec![
                "deepseek-r1-distill-llama-70b".to_string(),
                "llama3-70b-8192".to_string(),
            ],
            temperature: 0.3,
            max_tokens: 4096,
            max_iterations: 10,
            prompt_style: PromptStyle::Guided,
            include_history: false,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub groq: ProviderConfig,
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub deepseek: ProviderConfig,
}

impl ProvidersConfig {
    /// Provider names in registry order.
    pub const NAMES: [&'static str; 4] = ["groq", "openai", "openrouter", "deepseek"];

    /// Get a provider config by name (e.g. `"groq"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "groq" => Some(&self.groq),
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            "deepseek" => Some(&self.deepseek),
            _ => None,
        }
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "groq" => Some(&mut self.groq),
            "openai" => Some(&mut self.openai),
            "openrouter" => Some(&mut self.openrouter),
            "deepseek" => Some(&mut self.deepseek),
            _ => None,
        }
    }

    /// Convert to a map for use with the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get_by_name(name).map(|c| (name.to_string(), c.clone())))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Search tools
// ─────────────────────────────────────────────

/// Settings shared by the three lookup tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Results fetched from each source (1–5).
    pub max_results: u32,
    /// Character cap for each document's content.
    pub max_content_chars: usize,
    /// Per-request timeout for search backends.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_url: String,
    /// arXiv Atom query endpoint.
    pub arxiv_api_base: String,
    /// MediaWiki `api.php` endpoint.
    pub wikipedia_api_base: String,
}

impl SearchConfig {
    /// Clamp a requested per-source result count to the allowed range.
    pub fn clamp_results(requested: u32) -> u32 {
        requested.clamp(1, MAX_RESULTS_LIMIT)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            max_content_chars: 500,
            timeout_secs: 20,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) SearchBot/0.1".to_string(),
            duckduckgo_url: "https://html.duckduckgo.com/html/".to_string(),
            arxiv_api_base: "https://export.arxiv.org/api/query".to_string(),
            wikipedia_api_base: "https://en.wikipedia.org/w/api.php".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat transcript
// ─────────────────────────────────────────────

/// Visible chat history settings and fixed assistant texts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Entries kept in a transcript; older ones are dropped. 0 = unbounded.
    pub max_history: usize,
    pub greeting: String,
    pub cleared_greeting: String,
    /// Assistant reply stored when a run fails.
    pub error_reply: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history: 20,
            greeting: "Hi! I'm an AI assistant with web search capabilities. How can I help you today?"
                .to_string(),
            cleared_greeting: "Chat history cleared. How can I help you now?".to_string(),
            error_reply:
                "Sorry, I encountered an error processing your request. Please try again."
                    .to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Web
// ─────────────────────────────────────────────

/// Web chat server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
