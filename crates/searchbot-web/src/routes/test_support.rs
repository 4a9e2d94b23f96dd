//! Shared fixtures for route tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use searchbot_agent::SearchAgent;
use searchbot_core::config::{Config, KeyStatus};
use searchbot_core::session::SessionManager;
use searchbot_core::types::{LlmResponse, Message, ToolDefinition};
use searchbot_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::state::AppState;

/// Replays canned responses in order.
pub(crate) struct ScriptedProvider {
    responses: Mutex<Vec<LlmResponse>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> LlmResponse {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            text_response("(no more responses)")
        } else {
            responses.remove(0)
        }
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "ScriptedProvider"
    }
}

pub(crate) fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: Some(text.into()),
        finish_reason: Some("stop".into()),
        ..Default::default()
    }
}

/// App state over a temp session dir; `ready = false` simulates a missing
/// provider key (no agent).
pub(crate) fn test_state(responses: Vec<LlmResponse>, ready: bool) -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let sessions = SessionManager::new(Some(dir.path().to_path_buf()), config.chat.clone()).unwrap();

    let keys = KeyStatus {
        provider: "groq".into(),
        provider_key_var: "GROQ_API_KEY".into(),
        provider_configured: ready,
        present: vec![],
        missing: if ready { vec![] } else { vec!["GROQ_API_KEY".into()] },
    };

    let agent = ready.then(|| {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(responses),
        });
        SearchAgent::new(provider, config.agent.clone(), config.search.clone())
    });

    (AppState::new(config, sessions, keys, agent), dir)
}

pub(crate) async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
