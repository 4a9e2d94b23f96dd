//! API key verification.
//!
//! Before chatting, the active provider needs a key and every name listed in
//! `requiredEnv` must be present in the environment.

use serde::Serialize;

use super::loader::native_key_var;
use super::schema::Config;
use crate::error::CoreError;

/// Which keys are present, for status displays.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    /// Active provider name.
    pub provider: String,
    /// The provider's key variable (e.g. `GROQ_API_KEY`).
    pub provider_key_var: String,
    pub provider_configured: bool,
    /// Names from `requiredEnv` that are set.
    pub present: Vec<String>,
    /// Everything that is missing, provider key first.
    pub missing: Vec<String>,
}

impl KeyStatus {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Inspect key availability against the process environment.
pub fn key_status(config: &Config) -> KeyStatus {
    key_status_with(config, |name| std::env::var(name).ok())
}

/// Inspect key availability against an arbitrary variable lookup.
pub fn key_status_with<F>(config: &Config, lookup: F) -> KeyStatus
where
    F: Fn(&str) -> Option<String>,
{
    let provider = config.agent.provider.clone();
    let provider_key_var = native_key_var(&provider);
    let provider_configured = config
        .active_provider()
        .map(|p| p.is_configured())
        .unwrap_or(false);

    let mut missing = Vec::new();
    if !provider_configured {
        missing.push(provider_key_var.clone());
    }

    let mut present = Vec::new();
    for name in &config.required_env {
        if name == &provider_key_var {
            continue;
        }
        match lookup(name) {
            Some(v) if !v.is_empty() => present.push(name.clone()),
            _ => missing.push(name.clone()),
        }
    }

    KeyStatus {
        provider,
        provider_key_var,
        provider_configured,
        present,
        missing,
    }
}

/// Fail with the list of missing keys, or return the status when all are set.
pub fn verify_api_keys(config: &Config) -> Result<KeyStatus, CoreError> {
    let status = key_status(config);
    if status.is_ready() {
        Ok(status)
    } else {
        Err(CoreError::MissingApiKeys(status.missing))
    }
}
