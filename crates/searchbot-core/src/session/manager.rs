//! Transcript persistence and caching.
//!
//! File format: JSONL in `~/.searchbot/sessions/{safe_key}.jsonl`
//! - Line 1: `{"_type":"metadata","key":"...","created_at":"...","updated_at":"..."}`
//! - Line 2+: `{"role":"user","content":"hello","timestamp":"..."}`

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::transcript::Transcript;
use crate::config::ChatConfig;
use crate::types::ChatEntry;
use crate::utils;

// ─────────────────────────────────────────────
// Metadata (first line of JSONL)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct TranscriptMetadata {
    #[serde(rename = "_type")]
    record_type: String,
    #[serde(default)]
    key: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Manages chat transcripts with in-memory caching and JSONL persistence.
///
/// Thread-safe via `RwLock`.
pub struct SessionManager {
    sessions_dir: PathBuf,
    chat: ChatConfig,
    cache: RwLock<HashMap<String, Transcript>>,
}

impl SessionManager {
    /// Create a new session manager.
    ///
    /// `sessions_dir` defaults to `~/.searchbot/sessions/` if `None`.
    /// The directory is created if it doesn't exist.
    pub fn new(sessions_dir: Option<PathBuf>, chat: ChatConfig) -> std::io::Result<Self> {
        let dir = sessions_dir.unwrap_or_else(utils::get_sessions_path);
        std::fs::create_dir_all(&dir)?;

        Ok(SessionManager {
            sessions_dir: dir,
            chat,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Chat settings this manager was built with.
    pub fn chat_config(&self) -> &ChatConfig {
        &self.chat
    }

    /// Get an existing transcript or start a new one with the greeting.
    ///
    /// 1. Check in-memory cache
    /// 2. Try to load from disk
    /// 3. Create new transcript
    pub fn get_or_create(&self, key: &str) -> Transcript {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(t) = cache.get(key) {
                return t.clone();
            }
        }

        let transcript = self
            .load_from_disk(key)
            .unwrap_or_else(|| Transcript::new(key, &self.chat.greeting));

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(key.to_string(), transcript.clone());
        transcript
    }

    /// Append an entry (trimming to `max_history`) and persist.
    ///
    /// Returns the updated transcript.
    pub fn append(&self, key: &str, entry: ChatEntry) -> Transcript {
        let max = self.chat.max_history;
        self.update(key, |t| t.push(entry, max))
    }

    /// Reset a transcript to the "history cleared" notice and persist.
    pub fn reset(&self, key: &str) -> Transcript {
        let notice = self.chat.cleared_greeting.as_str();
        self.update(key, |t| t.reset(notice))
    }

    /// Delete a transcript entirely (from cache and disk).
    ///
    /// Returns `true` if the file existed on disk.
    pub fn delete(&self, key: &str) -> bool {
        {
            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            cache.remove(key);
        }

        let path = self.session_path(key);
        if !path.exists() {
            return false;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted session file: {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to delete session file: {}", e);
                false
            }
        }
    }

    /// List all transcripts on disk, newest first.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut summaries = Vec::new();

        let entries = match std::fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read sessions directory: {}", e);
                return summaries;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "jsonl") {
                continue;
            }

            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let reader = std::io::BufReader::new(file);
            let Some(Ok(line)) = reader.lines().next() else {
                continue;
            };
            if let Ok(meta) = serde_json::from_str::<TranscriptMetadata>(&line) {
                let key = if meta.key.is_empty() {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .map(|s| s.replacen('_', ":", 1))
                        .unwrap_or_default()
                } else {
                    meta.key
                };
                summaries.push(SessionSummary {
                    key,
                    created_at: meta.created_at,
                    updated_at: meta.updated_at,
                    path: path.clone(),
                });
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Modify a transcript in place and write it to disk, all under the
    /// cache write lock so concurrent updates to one key apply in order.
    /// Persistence failures are logged.
    fn update<F>(&self, key: &str, modify: F) -> Transcript
    where
        F: FnOnce(&mut Transcript),
    {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let transcript = cache.entry(key.to_string()).or_insert_with(|| {
            self.load_from_disk(key)
                .unwrap_or_else(|| Transcript::new(key, &self.chat.greeting))
        });

        modify(transcript);

        if let Err(e) = self.save_to_disk(transcript) {
            warn!("Failed to persist session {}: {}", transcript.key, e);
        }
        transcript.clone()
    }

    fn session_path(&self, key: &str) -> PathBuf {
        let safe_key = utils::safe_filename(&key.replace(':', "_"));
        self.sessions_dir.join(format!("{}.jsonl", safe_key))
    }

    fn load_from_disk(&self, key: &str) -> Option<Transcript> {
        let path = self.session_path(key);
        if !path.exists() {
            return None;
        }

        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to open session file {}: {}", path.display(), e);
                return None;
            }
        };

        let mut transcript = Transcript::new(key, &self.chat.greeting);
        transcript.entries.clear();

        for line in std::io::BufReader::new(file).lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }

            if let Ok(meta) = serde_json::from_str::<TranscriptMetadata>(&line) {
                if meta.record_type == "metadata" {
                    transcript.created_at = meta.created_at;
                    transcript.updated_at = meta.updated_at;
                    continue;
                }
            }

            match serde_json::from_str::<ChatEntry>(&line) {
                Ok(entry) => transcript.entries.push(entry),
                Err(e) => debug!("Skipping unreadable session line: {}", e),
            }
        }

        if transcript.entries.is_empty() {
            transcript.reset(&self.chat.greeting);
        }
        // Files written under a larger limit get cut on load.
        transcript.trim(self.chat.max_history);

        debug!(
            "Loaded session '{}' with {} entries from disk",
            key,
            transcript.len()
        );
        Some(transcript)
    }

    fn save_to_disk(&self, transcript: &Transcript) -> std::io::Result<()> {
        let path = self.session_path(&transcript.key);
        let mut file = std::fs::File::create(&path)?;

        let meta = TranscriptMetadata {
            record_type: "metadata".to_string(),
            key: transcript.key.clone(),
            created_at: transcript.created_at,
            updated_at: transcript.updated_at,
        };
        writeln!(file, "{}", serde_json::to_string(&meta)?)?;

        for entry in &transcript.entries {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }

        debug!(
            "Saved session '{}' ({} entries) to {}",
            transcript.key,
            transcript.len(),
            path.display()
        );
        Ok(())
    }
}

/// Summary of a transcript for listing purposes.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub path: PathBuf,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
