//! Live progress events emitted while the agent works on a query.
//!
//! The console prints them as they arrive; the web API returns them as the
//! `steps` list next to the answer.

use std::sync::Mutex;

use serde::Serialize;

/// One step of an agent run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AgentEvent {
    /// Model reasoning (a `<think>` block or provider reasoning field).
    Thinking { text: String },
    /// A tool call is about to run.
    #[serde(rename_all = "camelCase")]
    ToolStarted {
        tool: String,
        display_name: String,
        query: String,
    },
    /// A tool call finished; `output` is the leading part of the result.
    #[serde(rename_all = "camelCase")]
    ToolFinished {
        tool: String,
        display_name: String,
        query: String,
        output: String,
        is_error: bool,
    },
    /// The iteration cap was hit; a final tool-free answer is being requested.
    IterationLimit { iterations: u32 },
    /// The final answer.
    Answer { content: String },
}

/// Receives events as they happen.
pub trait AgentObserver: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl AgentObserver for NoopObserver {
    fn on_event(&self, _event: &AgentEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AgentObserver for RecordingObserver {
    fn on_event(&self, event: &AgentEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
