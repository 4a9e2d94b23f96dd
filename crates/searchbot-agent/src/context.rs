//! Context builder: system prompt and message list for each agent run.

use searchbot_core::config::PromptStyle;
use searchbot_core::types::{ChatEntry, Message, ToolCall};

/// Sent as a user turn when the iteration cap is hit, before the last
/// tool-free call.
pub const FINAL_ANSWER_INSTRUCTION: &str = "You have reached the maximum number of tool calls. \
Do not call any more tools. Using only the observations gathered so far, \
give your best final answer to the user query now.";

const GUIDELINES: &str = "\
Follow these guidelines:
1. Think about which source fits the question before calling a tool, and review each observation before the next step
2. Provide well-structured, concise responses
3. Cite sources when available
4. If unsure, say you don't know rather than guessing
5. For complex queries, break them down into smaller questions";

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

/// Builds system prompts and conversation message lists for the agent loop.
#[derive(Clone, Debug, Default)]
pub struct ContextBuilder {
    style: PromptStyle,
}

impl ContextBuilder {
    pub fn new(style: PromptStyle) -> Self {
        Self { style }
    }

    /// Build the system prompt for the given model and per-source result count.
    pub fn build_system_prompt(&self, model: &str, max_results: u32) -> String {
        let mut parts = vec![
            "You are an advanced AI research assistant with access to multiple search tools: \
             web search, academic papers (arXiv) and Wikipedia."
                .to_string(),
        ];

        if self.style == PromptStyle::Guided {
            parts.push(GUIDELINES.to_string());
        }

        parts.push(format!(
            "Current configuration:\n- Model: {model}\n- Max results per source: {max_results}"
        ));

        parts.join("\n\n")
    }

    /// Build the full message list for an LLM call.
    ///
    /// 1. System prompt
    /// 2. Prior conversation turns (may be empty)
    /// 3. Current user query
    pub fn build_messages(
        &self,
        history: &[ChatEntry],
        question: &str,
        model: &str,
        max_results: u32,
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.build_system_prompt(model, max_results)));
        messages.extend(history.iter().map(ChatEntry::to_message));
        messages.push(Message::user(format!("User query: {question}")));
        messages
    }

    /// Add a tool result to the message list.
    pub fn add_tool_result(messages: &mut Vec<Message>, tool_call_id: &str, result: &str) {
        messages.push(Message::tool_result(tool_call_id, result));
    }

    /// Add an assistant message (with optional tool calls) to the message list.
    pub fn add_assistant_message(
        messages: &mut Vec<Message>,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        if tool_calls.is_empty() {
            if let Some(text) = content {
                messages.push(Message::assistant(text));
            }
        } else {
            messages.push(Message::assistant_tool_calls(content, tool_calls));
        }
    }
}
