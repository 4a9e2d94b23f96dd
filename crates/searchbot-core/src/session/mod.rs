//! Chat transcripts: in-memory cache + JSONL file persistence.
//!
//! # Disk format (JSONL)
//!
//! Each transcript is a `.jsonl` file under `~/.searchbot/sessions/`.
//! - Line 1: metadata `{"_type": "metadata", "key": "...", "created_at": "...", "updated_at": "..."}`
//! - Lines 2+: entries `{"role": "user", "content": "hello", "timestamp": "..."}`

pub mod manager;
pub mod transcript;

pub use manager::{SessionManager, SessionSummary};
pub use transcript::Transcript;
