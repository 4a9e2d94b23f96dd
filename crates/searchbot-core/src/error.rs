//! Typed errors surfaced by the core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more API keys the current configuration needs are not set.
    #[error("Missing API keys: {}", .0.join(", "))]
    MissingApiKeys(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
