//! The visible chat history for one conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatEntry, ChatRole};

/// A conversation transcript: greeting first, then alternating turns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    pub key: String,
    pub entries: Vec<ChatEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Start a transcript with the assistant's greeting.
    pub fn new(key: impl Into<String>, greeting: &str) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            entries: vec![ChatEntry::assistant(greeting)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an entry, then keep only the newest `max` entries (0 = unbounded).
    pub fn push(&mut self, entry: ChatEntry, max: usize) {
        self.entries.push(entry);
        self.trim(max);
        self.updated_at = Utc::now();
    }

    /// Drop the oldest entries so that at most `max` remain (0 = unbounded).
    pub fn trim(&mut self, max: usize) {
        if max > 0 && self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
    }

    /// Replace everything with a single assistant notice.
    pub fn reset(&mut self, notice: &str) {
        self.entries = vec![ChatEntry::assistant(notice)];
        self.updated_at = Utc::now();
    }

    /// Prior conversation turns for model context: everything except a
    /// leading assistant greeting.
    pub fn conversation(&self) -> &[ChatEntry] {
        match self.entries.first() {
            Some(first) if first.role == ChatRole::Assistant => &self.entries[1..],
            _ => &self.entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_has_greeting() {
        let t = Transcript::new("cli:default", "Hello there");
        assert_eq!(t.len(), 1);
        assert_eq!(t.entries[0].role, ChatRole::Assistant);
        assert_eq!(t.entries[0].content, "Hello there");
        assert!(t.conversation().is_empty());
    }

    #[test]
    fn push_trims_to_newest() {
        let mut t = Transcript::new("k", "greeting");
        for i in 0..25 {
            t.push(ChatEntry::user(format!("q{i}")), 20);
        }
        assert_eq!(t.len(), 20);
        assert_eq!(t.entries[0].content, "q5");
        assert_eq!(t.last().unwrap().content, "q24");
    }

    #[test]
    fn push_unbounded_when_zero() {
        let mut t = Transcript::new("k", "greeting");
        for i in 0..30 {
            t.push(ChatEntry::user(format!("q{i}")), 0);
        }
        assert_eq!(t.len(), 31);
    }

    #[test]
    fn trim_drops_greeting_first() {
        let mut t = Transcript::new("k", "greeting");
        t.push(ChatEntry::user("q"), 2);
        t.push(ChatEntry::assistant("a"), 2);
        assert_eq!(t.entries[0].content, "q");
        // No greeting left, so every entry is conversation
        assert_eq!(t.conversation().len(), 2);
    }

    #[test]
    fn reset_replaces_entries() {
        let mut t = Transcript::new("k", "greeting");
        t.push(ChatEntry::user("q"), 20);
        t.reset("Cleared.");
        assert_eq!(t.len(), 1);
        assert_eq!(t.entries[0].content, "Cleared.");
        assert!(!t.is_empty());
    }
}
