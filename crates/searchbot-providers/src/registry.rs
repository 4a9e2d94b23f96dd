//! Provider registry: static specs for the supported hosted LLM providers.
//!
//! Each `ProviderSpec` describes how to reach one OpenAI-compatible backend:
//! keywords for model matching, the API key variable, the default API base
//! and where to obtain a key.

use std::collections::HashMap;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"groq"`), matching the config key.
    pub name: &'static str,
    /// Keywords to match in model names (lowercase).
    pub keywords: &'static [&'static str],
    /// Environment variable for the API key. E.g. `"GROQ_API_KEY"`.
    pub env_key: &'static str,
    /// Human-readable name for logs. E.g. `"Groq"`.
    pub display_name: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Page where a user can create an API key.
    pub key_url: &'static str,
}

// ─────────────────────────────────────────────
// Providers (in matching priority order)
// ─────────────────────────────────────────────

/// Supported provider specifications, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "groq",
        keywords: &["groq", "llama", "mixtral", "gemma"],
        env_key: "GROQ_API_KEY",
        display_name: "Groq",
        default_api_base: "https://api.groq.com/openai/v1",
        key_url: "https://console.groq.com/keys",
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        key_url: "https://platform.openai.com/api-keys",
    },
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        default_api_base: "https://openrouter.ai/api/v1",
        key_url: "https://openrouter.ai/keys",
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        default_api_base: "https://api.deepseek.com/v1",
        key_url: "https://platform.deepseek.com/api_keys",
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Find a provider spec by matching keywords against a model name.
///
/// Returns the first match in priority order.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| spec.keywords.iter().any(|kw| model_lower.contains(kw)))
}

/// Strip a `<provider>/` routing prefix from a model id.
///
/// `"groq/llama3-70b-8192"` → `"llama3-70b-8192"`. Other slashes are kept,
/// since OpenRouter model ids look like `"meta-llama/llama-3-70b"`.
pub fn resolve_model_name(model: &str, spec: &ProviderSpec) -> String {
    model
        .strip_prefix(spec.name)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(model)
        .to_string()
}

/// Re-export the provider config from core.
pub use searchbot_core::config::schema::ProviderConfig;

/// Pick the provider to use for a model.
///
/// 1. The explicitly named provider, if it has an API key.
/// 2. A keyword match on the model name, if that provider has an API key.
/// 3. The first configured provider in registry order.
pub fn match_provider<'a>(
    name: Option<&str>,
    model: &str,
    providers: &'a HashMap<String, ProviderConfig>,
) -> Option<(&'a ProviderConfig, &'static ProviderSpec)> {
    let configured = |spec: &'static ProviderSpec| {
        providers
            .get(spec.name)
            .filter(|c| c.is_configured())
            .map(|c| (c, spec))
    };

    // 1. Explicit provider name
    if let Some(found) = name.and_then(find_by_name).and_then(configured) {
        return Some(found);
    }

    // 2. Keyword match on the model
    if let Some(found) = find_by_model(model).and_then(configured) {
        return Some(found);
    }

    // 3. Fallback to the first configured provider
    PROVIDERS.iter().find_map(configured)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_by_name() {
        let spec = find_by_name("groq").unwrap();
        assert_eq!(spec.display_name, "Groq");
        assert_eq!(spec.env_key, "GROQ_API_KEY");
        assert_eq!(spec.key_url, "https://console.groq.com/keys");
        assert!(find_by_name("anthropic").is_none());
    }

    #[test]
    fn test_find_by_model() {
        assert_eq!(find_by_model("gpt-4o-mini").unwrap().name, "openai");
        assert_eq!(find_by_model("deepseek-chat").unwrap().name, "deepseek");
        assert_eq!(find_by_model("Llama3-70b-8192").unwrap().name, "groq");
        assert!(find_by_model("some-random-model-xyz").is_none());
    }

    #[test]
    fn test_find_by_model_priority() {
        // Contains both "deepseek" and "llama"; Groq comes first.
        let spec = find_by_model("deepseek-r1-distill-llama-70b").unwrap();
        assert_eq!(spec.name, "groq");
    }

    #[test]
    fn test_resolve_model_strips_own_prefix() {
        let groq = find_by_name("groq").unwrap();
        assert_eq!(resolve_model_name("groq/llama3-70b-8192", groq), "llama3-70b-8192");
        assert_eq!(resolve_model_name("llama3-70b-8192", groq), "llama3-70b-8192");
    }

    #[test]
    fn test_resolve_model_keeps_foreign_slash() {
        let openrouter = find_by_name("openrouter").unwrap();
        assert_eq!(
            resolve_model_name("meta-llama/llama-3-70b", openrouter),
            "meta-llama/llama-3-70b"
        );
        assert_eq!(
            resolve_model_name("openrouter/meta-llama/llama-3-70b", openrouter),
            "meta-llama/llama-3-70b"
        );
    }

    #[test]
    fn test_match_provider_explicit_name_wins() {
        let mut providers = HashMap::new();
        providers.insert("groq".to_string(), keyed("gsk-1"));
        providers.insert("deepseek".to_string(), keyed("ds-1"));

        let (config, spec) = match_provider(Some("deepseek"), "llama3-70b-8192", &providers).unwrap();
        assert_eq!(spec.name, "deepseek");
        assert_eq!(config.api_key, "ds-1");
    }

    #[test]
    fn test_match_provider_unconfigured_name_falls_back_to_keyword() {
        let mut providers = HashMap::new();
        providers.insert("groq".to_string(), keyed(""));
        providers.insert("openai".to_string(), keyed("sk-1"));

        let (_, spec) = match_provider(Some("groq"), "gpt-4o", &providers).unwrap();
        assert_eq!(spec.name, "openai");
    }

    #[test]
    fn test_match_provider_first_configured_fallback() {
        let mut providers = HashMap::new();
        providers.insert("openrouter".to_string(), keyed("sk-or-1"));

        let (_, spec) = match_provider(None, "some-unknown-model", &providers).unwrap();
        assert_eq!(spec.name, "openrouter");
    }

    #[test]
    fn test_match_provider_no_key() {
        let mut providers = HashMap::new();
        providers.insert("groq".to_string(), keyed(""));
        assert!(match_provider(Some("groq"), "llama3-70b-8192", &providers).is_none());
    }

    #[test]
    fn test_registry_matches_config_names() {
        let names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        assert_eq!(names, searchbot_core::config::ProvidersConfig::NAMES);
    }
}
