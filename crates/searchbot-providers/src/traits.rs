//! The seam between the search agent and a hosted chat model.
//!
//! Groq, OpenAI, OpenRouter and DeepSeek all expose the same
//! chat-completions protocol, so one `HttpProvider` serves them all.

use async_trait::async_trait;
use searchbot_core::config::AgentSettings;
use searchbot_core::types::{LlmResponse, Message, ToolDefinition};

/// Sampling settings sent with every completion.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequestConfig {
    pub max_tokens: u32,
    /// 0.0 to 2.0.
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self::from(&AgentSettings::default())
    }
}

impl From<&AgentSettings> for LlmRequestConfig {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// A chat model that can answer or ask for search tool calls.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One completion round. `tools` is `None` when the model must answer
    /// without searching (the final round after the step limit).
    ///
    /// Transport and API failures come back as `LlmResponse::error`, never
    /// as a panic or a dropped call.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> LlmResponse;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;

    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_config_follows_agent_settings() {
        let settings = AgentSettings {
            max_tokens: 1024,
            temperature: 0.0,
            ..AgentSettings::default()
        };
        let config = LlmRequestConfig::from(&settings);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(
            LlmRequestConfig::default(),
            LlmRequestConfig::from(&AgentSettings::default())
        );
    }
}
