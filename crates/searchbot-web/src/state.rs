//! Shared state handed to every route.

use std::sync::Arc;

use searchbot_agent::SearchAgent;
use searchbot_core::config::{Config, KeyStatus};
use searchbot_core::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    /// Key availability captured at startup.
    pub keys: KeyStatus,
    /// `None` when the provider could not be created (missing key).
    pub agent: Option<Arc<SearchAgent>>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: SessionManager,
        keys: KeyStatus,
        agent: Option<SearchAgent>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            keys,
            agent: agent.map(Arc::new),
        }
    }

    /// Session key for a browser-supplied conversation id.
    pub fn session_key(id: &str) -> String {
        format!("web:{}", searchbot_core::utils::safe_filename(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_session_key_is_sanitized() {
        assert_eq!(AppState::session_key("abc-123"), "web:abc-123");
        assert!(!AppState::session_key("../../etc/passwd").contains('/'));
    }
}
