//! Config loader: reads `~/.searchbot/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.searchbot/config.json`
//! 3. Environment variables `SEARCHBOT_<SECTION>__<FIELD>` (override JSON)
//! 4. Native provider key variables (`GROQ_API_KEY`, …) fill keys still empty

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig, ProvidersConfig};
use crate::error::Result;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(read_config_file(&config_path))
}

/// Read and migrate the JSON file, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `groqApiKey` → `providers.groq.apiKey` unless the latter is set.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    let Some(legacy) = obj.remove("groqApiKey") else {
        return;
    };

    let providers = obj
        .entry("providers")
        .or_insert_with(|| serde_json::json!({}));
    if !providers.is_object() {
        return;
    }
    let groq = providers
        .as_object_mut()
        .map(|p| p.entry("groq").or_insert_with(|| serde_json::json!({})));

    if let Some(groq) = groq.and_then(|g| g.as_object_mut()) {
        let current = groq.get("apiKey").and_then(|v| v.as_str()).unwrap_or("");
        if current.is_empty() {
            groq.insert("apiKey".to_string(), legacy);
            debug!("Migrated groqApiKey → providers.groq.apiKey");
        }
    }
}

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Env var format: `SEARCHBOT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// - `SEARCHBOT_AGENT__PROVIDER` → `agent.provider`
/// - `SEARCHBOT_AGENT__MODEL` → `agent.model`
/// - `SEARCHBOT_AGENT__TEMPERATURE` → `agent.temperature`
/// - `SEARCHBOT_AGENT__MAX_ITERATIONS` → `agent.max_iterations`
/// - `SEARCHBOT_SEARCH__MAX_RESULTS` → `search.max_results`
/// - `SEARCHBOT_WEB__HOST` / `SEARCHBOT_WEB__PORT` → `web.*`
/// - `SEARCHBOT_PROVIDERS__<NAME>__API_KEY` / `__API_BASE` → `providers.<name>.*`
/// - `<NAME>_API_KEY` → `providers.<name>.api_key` when still empty
pub fn apply_overrides_with<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("SEARCHBOT_AGENT__PROVIDER") {
        config.agent.provider = val;
    }
    if let Some(val) = lookup("SEARCHBOT_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(t) = lookup("SEARCHBOT_AGENT__TEMPERATURE").and_then(|v| v.parse::<f64>().ok()) {
        config.agent.temperature = t;
    }
    if let Some(n) = lookup("SEARCHBOT_AGENT__MAX_ITERATIONS").and_then(|v| v.parse::<u32>().ok()) {
        config.agent.max_iterations = n;
    }
    if let Some(n) = lookup("SEARCHBOT_SEARCH__MAX_RESULTS").and_then(|v| v.parse::<u32>().ok()) {
        config.search.max_results = n;
    }

    if let Some(val) = lookup("SEARCHBOT_WEB__HOST") {
        config.web.host = val;
    }
    if let Some(p) = lookup("SEARCHBOT_WEB__PORT").and_then(|v| v.parse::<u16>().ok()) {
        config.web.port = p;
    }

    for name in ProvidersConfig::NAMES {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, name, &lookup);
        }
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env<F>(provider: &mut ProviderConfig, name: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let upper = name.to_uppercase();
    if let Some(val) = lookup(&format!("SEARCHBOT_PROVIDERS__{upper}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = lookup(&format!("SEARCHBOT_PROVIDERS__{upper}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Some(val) = lookup(&native_key_var(name)).filter(|v| !v.is_empty()) {
            provider.api_key = val;
        }
    }
}

/// The provider's own key variable, e.g. `groq` → `GROQ_API_KEY`.
pub fn native_key_var(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = read_config_file(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.web.port, 8501);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": { "model": "llama3-70b-8192", "maxTokens": 2048 }
        }"#,
        );

        let config = read_config_file(file.path());
        assert_eq!(config.agent.model, "llama3-70b-8192");
        assert_eq!(config.agent.max_tokens, 2048);
        assert_eq!(config.agent.temperature, 0.3);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = read_config_file(file.path());
        assert_eq!(config.agent.model, "deepseek-r1-distill-llama-70b");
    }

    #[test]
    fn test_load_wrong_types_returns_defaults() {
        let file = write_temp_json(r#"{ "web": { "port": "not-a-port" } }"#);
        let config = read_config_file(file.path());
        assert_eq!(config.web.port, 8501);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.agent.model = "llama3-70b-8192".to_string();
        config.providers.groq.api_key = "gsk-test".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = read_config_file(&path);
        assert_eq!(reloaded.agent.model, "llama3-70b-8192");
        assert_eq!(reloaded.providers.groq.api_key, "gsk-test");
    }

    #[test]
    fn test_save_into_file_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = save_config(&Config::default(), Some(&blocker.join("config.json"))).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Io(_)));
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        save_config(&Config::default(), Some(&path)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["agent"].get("maxTokens").is_some());
        assert!(raw["agent"].get("max_tokens").is_none());
    }

    #[test]
    fn test_migrate_legacy_groq_key() {
        let file = write_temp_json(r#"{ "groqApiKey": "gsk-legacy" }"#);
        let config = read_config_file(file.path());
        assert_eq!(config.providers.groq.api_key, "gsk-legacy");
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(
            r#"{
            "groqApiKey": "gsk-legacy",
            "providers": { "groq": { "apiKey": "gsk-current" } }
        }"#,
        );
        let config = read_config_file(file.path());
        assert_eq!(config.providers.groq.api_key, "gsk-current");
    }

    #[test]
    fn test_env_override_agent_fields() {
        let config = apply_overrides_with(
            Config::default(),
            env(&[
                ("SEARCHBOT_AGENT__MODEL", "llama3-70b-8192"),
                ("SEARCHBOT_AGENT__TEMPERATURE", "0.9"),
                ("SEARCHBOT_AGENT__MAX_ITERATIONS", "3"),
                ("SEARCHBOT_SEARCH__MAX_RESULTS", "5"),
                ("SEARCHBOT_WEB__PORT", "9999"),
            ]),
        );
        assert_eq!(config.agent.model, "llama3-70b-8192");
        assert_eq!(config.agent.temperature, 0.9);
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.web.port, 9999);
    }

    #[test]
    fn test_env_override_ignores_unparseable() {
        let config = apply_overrides_with(
            Config::default(),
            env(&[("SEARCHBOT_WEB__PORT", "eighty")]),
        );
        assert_eq!(config.web.port, 8501);
    }

    #[test]
    fn test_native_key_fills_empty_provider() {
        let config = apply_overrides_with(Config::default(), env(&[("GROQ_API_KEY", "gsk-env")]));
        assert_eq!(config.providers.groq.api_key, "gsk-env");
    }

    #[test]
    fn test_native_key_does_not_override_file() {
        let mut base = Config::default();
        base.providers.groq.api_key = "gsk-file".into();
        let config = apply_overrides_with(base, env(&[("GROQ_API_KEY", "gsk-env")]));
        assert_eq!(config.providers.groq.api_key, "gsk-file");
    }

    #[test]
    fn test_prefixed_key_overrides_file() {
        let mut base = Config::default();
        base.providers.openai.api_key = "sk-file".into();
        let config = apply_overrides_with(
            base,
            env(&[
                ("SEARCHBOT_PROVIDERS__OPENAI__API_KEY", "sk-env"),
                ("SEARCHBOT_PROVIDERS__OPENAI__API_BASE", "http://proxy/v1"),
            ]),
        );
        assert_eq!(config.providers.openai.api_key, "sk-env");
        assert_eq!(config.providers.openai.api_base.as_deref(), Some("http://proxy/v1"));
    }

    #[test]
    fn test_native_key_var() {
        assert_eq!(native_key_var("groq"), "GROQ_API_KEY");
        assert_eq!(native_key_var("openrouter"), "OPENROUTER_API_KEY");
    }
}
