//! Sidebar data: provider, key status, selectable models and defaults.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use searchbot_core::config::schema::MAX_RESULTS_LIMIT;

use crate::state::AppState;

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/api/status", get(get_status))
}

async fn get_status(State(state): State<AppState>) -> Json<Value> {
    let agent = &state.config.agent;
    Json(json!({
        "provider": agent.provider,
        "ready": state.keys.is_ready() && state.agent.is_some(),
        "keys": state.keys,
        "missing": state.keys.missing,
        "models": agent.models,
        "defaults": {
            "model": agent.model,
            "maxResults": state.config.search.max_results,
            "maxResultsLimit": MAX_RESULTS_LIMIT,
        },
        "greeting": state.config.chat.greeting,
    }))
}
