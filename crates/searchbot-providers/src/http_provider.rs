//! HTTP client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Groq, OpenAI, OpenRouter and DeepSeek all accept the same request shape,
//! so a single provider type covers them; only the base URL and key differ.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use searchbot_core::config::Config;
use searchbot_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message, ToolDefinition,
};

use crate::registry::{resolve_model_name, ProviderConfig, ProviderSpec};
use crate::traits::{LlmProvider, LlmRequestConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// Chat-completions client bound to one provider's base URL and key.
pub struct HttpProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    /// Sent on every request, e.g. OpenRouter's `HTTP-Referer`.
    extra_headers: HeaderMap,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// An empty or missing `api_base` in `config` falls back to the `ProviderSpec`'s
    /// default endpoint. Header pairs that are not valid HTTP are skipped.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec, model: &str) -> Self {
        let api_base = match config.api_base.as_deref() {
            Some(base) if !base.is_empty() => base.to_string(),
            _ => spec.default_api_base.to_string(),
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            extra_headers: header_map(config),
            spec,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn spec(&self) -> &'static ProviderSpec {
        self.spec
    }

    /// POST one request; the `Err` text is what the agent reports upward.
    async fn post_completion(&self, body: &ChatCompletionRequest) -> Result<ChatCompletionResponse, String> {
        let provider = self.spec.display_name;
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider, error = %e, "completion request failed");
                format!("Error calling LLM: {e}")
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider, status = %status, body = %detail, "completion rejected");
            return Err(format!("Error calling LLM: {status} {detail}"));
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(provider, error = %e, "unreadable completion body");
            format!("Error parsing LLM response: {e}")
        })
    }
}

fn header_map(config: &ProviderConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in config.extra_headers.iter().flatten() {
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(val)) => {
                headers.insert(name, val);
            }
            _ => warn!(header = %key, "skipping invalid extra header"),
        }
    }
    headers
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> LlmResponse {
        let body = ChatCompletionRequest {
            model: resolve_model_name(model, self.spec),
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDefinition]>::to_vec),
            tool_choice: tools.map(|_| "auto".to_string()),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };
        debug!(
            provider = self.spec.display_name,
            model = %body.model,
            messages = messages.len(),
            tools = tools.map_or(0, <[ToolDefinition]>::len),
            "requesting completion"
        );

        match self.post_completion(&body).await {
            Ok(completion) => {
                let reply = LlmResponse::from(completion);
                debug!(
                    provider = self.spec.display_name,
                    has_content = reply.content.is_some(),
                    tool_calls = reply.tool_calls.len(),
                    finish_reason = reply.finish_reason.as_deref().unwrap_or("?"),
                    "completion received"
                );
                reply
            }
            Err(message) => LlmResponse::error(message),
        }
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Build an HttpProvider for `config.agent.provider` / `config.agent.model`.
///
/// Fails with a message naming the key variable and where to get a key when
/// no provider has an API key configured.
pub fn create_provider(config: &Config) -> Result<HttpProvider, String> {
    let model = &config.agent.model;
    let providers = config.providers.to_map();

    let (provider_config, spec) =
        crate::registry::match_provider(Some(&config.agent.provider), model, &providers)
            .ok_or_else(|| {
                let wanted = crate::registry::find_by_name(&config.agent.provider)
                    .or_else(|| crate::registry::find_by_model(model))
                    .unwrap_or(&crate::registry::PROVIDERS[0]);
                format!(
                    "No configured provider found for model '{}'. \
                     Set {} (get a key at {}).",
                    model, wanted.env_key, wanted.key_url
                )
            })?;

    debug!(
        provider = spec.display_name,
        model = %model,
        api_base = provider_config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM provider"
    );

    Ok(HttpProvider::new(provider_config, spec, model))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
