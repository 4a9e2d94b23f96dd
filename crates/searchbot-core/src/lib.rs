//! SearchBot core: shared types, configuration, and chat transcripts.
//!
//! - **types**: OpenAI-format messages/tool calls and transcript entries
//! - **config**: JSON config schema, loader with env overrides, key checks
//! - **session**: transcript trimming and JSONL persistence
//! - **utils**: paths and string helpers

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use error::CoreError;
