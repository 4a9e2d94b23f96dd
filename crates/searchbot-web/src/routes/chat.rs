//! Conversation endpoints: read a transcript, ask a question, clear history.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use searchbot_agent::{AgentRequest, NoopObserver};
use searchbot_core::session::Transcript;
use searchbot_core::types::ChatEntry;

use crate::state::AppState;
use crate::{Result, WebError};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/messages", get(get_messages))
        .route("/api/sessions/{id}/chat", post(chat))
        .route("/api/sessions/{id}/clear", post(clear))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    prompt: String,
    model: Option<String>,
    max_results: Option<u32>,
}

async fn get_messages(State(state): State<AppState>, Path(id): Path<String>) -> Json<Transcript> {
    Json(state.sessions.get_or_create(&AppState::session_key(&id)))
}

async fn clear(State(state): State<AppState>, Path(id): Path<String>) -> Json<Transcript> {
    let key = AppState::session_key(&id);
    info!(session = %key, "clearing chat history");
    Json(state.sessions.reset(&key))
}

async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>> {
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(WebError::BadRequest("Prompt must not be empty".into()));
    }

    let model = req.model.filter(|m| !m.trim().is_empty());
    if let Some(model) = &model {
        if !state.config.is_known_model(model) {
            return Err(WebError::BadRequest(format!("Unknown model: {model}")));
        }
    }

    if !state.keys.is_ready() {
        return Err(WebError::MissingKeys(state.keys.missing.clone()));
    }
    let Some(agent) = state.agent.clone() else {
        return Err(WebError::MissingKeys(vec![state.keys.provider_key_var.clone()]));
    };

    let key = AppState::session_key(&id);
    let history = state.sessions.get_or_create(&key).conversation().to_vec();
    state.sessions.append(&key, ChatEntry::user(prompt));

    let request = AgentRequest {
        question: prompt.to_string(),
        model,
        max_results: req.max_results,
        history,
    };

    match agent.run(request, &NoopObserver).await {
        Ok(reply) => {
            state.sessions.append(
                &key,
                ChatEntry::assistant(&reply.content).with_sources(reply.sources.clone()),
            );
            Ok(Json(json!({
                "reply": reply.content,
                "sources": reply.sources,
                "steps": reply.steps,
                "model": reply.model,
            })))
        }
        Err(e) => {
            warn!(session = %key, error = %e, "agent run failed");
            let error_reply = state.sessions.chat_config().error_reply.clone();
            state.sessions.append(&key, ChatEntry::assistant(&error_reply));
            Ok(Json(json!({
                "reply": error_reply,
                "sources": [],
                "steps": [],
                "error": e.to_string(),
            })))
        }
    }
}
