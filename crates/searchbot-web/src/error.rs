use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebError>;

/// Failures surfaced by the web layer, each mapped to an HTTP status.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing API keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::MissingKeys(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebError::Config(_) | WebError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            WebError::MissingKeys(missing) => json!({
                "error": self.to_string(),
                "missing": missing,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WebError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebError::MissingKeys(vec!["GROQ_API_KEY".into()]).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            WebError::Config("bad".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_keys_message() {
        let err = WebError::MissingKeys(vec!["GROQ_API_KEY".into(), "SERPER_API_KEY".into()]);
        assert_eq!(err.to_string(), "Missing API keys: GROQ_API_KEY, SERPER_API_KEY");
    }
}
