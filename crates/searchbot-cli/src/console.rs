//! Console conversation: runs the agent for one question at a time, prints
//! tool progress live and keeps the transcript.

use colored::Colorize;
use tracing::warn;

use searchbot_agent::{AgentEvent, AgentObserver, AgentRequest, SearchAgent};
use searchbot_core::config::SearchConfig;
use searchbot_core::session::{SessionManager, Transcript};
use searchbot_core::types::ChatEntry;
use searchbot_core::utils::truncate_string;

use crate::helpers;

// ─────────────────────────────────────────────
// Live progress
// ─────────────────────────────────────────────

/// Prints agent steps to stderr as they happen.
pub struct ConsoleObserver {
    show_thinking: bool,
}

impl AgentObserver for ConsoleObserver {
    fn on_event(&self, event: &AgentEvent) {
        if let Some(line) = progress_line(event, self.show_thinking) {
            eprintln!("{line}");
        }
    }
}

/// One display line per event; `None` for events not shown.
fn progress_line(event: &AgentEvent, show_thinking: bool) -> Option<String> {
    match event {
        AgentEvent::Thinking { text } if show_thinking => Some(format!(
            "  {} {}",
            "💭".dimmed(),
            truncate_string(text, 200).dimmed()
        )),
        AgentEvent::ToolStarted {
            display_name,
            query,
            ..
        } => Some(format!("  {} {}: {}", "🔍".cyan(), display_name.bold(), query)),
        AgentEvent::ToolFinished {
            display_name,
            is_error: true,
            output,
            ..
        } => Some(format!(
            "  {} {} failed: {}",
            "✗".red(),
            display_name,
            truncate_string(output, 120)
        )),
        AgentEvent::IterationLimit { iterations } => Some(format!(
            "  {} reached {} tool steps, asking for a final answer",
            "⚠".yellow(),
            iterations
        )),
        _ => None,
    }
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// A console conversation with its own model and result-count settings.
pub struct ConsoleChat {
    agent: SearchAgent,
    sessions: SessionManager,
    key: String,
    model: Option<String>,
    max_results: u32,
    observer: ConsoleObserver,
}

impl ConsoleChat {
    pub fn new(
        agent: SearchAgent,
        sessions: SessionManager,
        key: String,
        model: Option<String>,
        max_results: u32,
        show_thinking: bool,
    ) -> Self {
        Self {
            agent,
            sessions,
            key,
            model,
            max_results: SearchConfig::clamp_results(max_results),
            observer: ConsoleObserver { show_thinking },
        }
    }

    /// The model used for the next question.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.agent.model())
    }

    pub fn set_model(&mut self, model: String) {
        self.model = Some(model);
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Set the per-source result count, clamped to 1-5. Returns the value used.
    pub fn set_max_results(&mut self, n: u32) -> u32 {
        self.max_results = SearchConfig::clamp_results(n);
        self.max_results
    }

    pub fn transcript(&self) -> Transcript {
        self.sessions.get_or_create(&self.key)
    }

    /// Reset the transcript to the "history cleared" notice.
    pub fn clear(&self) -> Transcript {
        self.sessions.reset(&self.key)
    }

    /// Run one question and print the answer with its sources.
    pub async fn ask(&self, question: &str) {
        let history = self.transcript().conversation().to_vec();
        self.sessions.append(&self.key, ChatEntry::user(question));

        let request = AgentRequest {
            question: question.to_string(),
            model: self.model.clone(),
            max_results: Some(self.max_results),
            history,
        };

        match self.agent.run(request, &self.observer).await {
            Ok(reply) => {
                helpers::print_answer(&reply.content, &reply.sources);
                self.sessions.append(
                    &self.key,
                    ChatEntry::assistant(reply.content).with_sources(reply.sources),
                );
            }
            Err(e) => {
                warn!(session = %self.key, error = %e, "agent run failed");
                let error_reply = self.sessions.chat_config().error_reply.clone();
                helpers::print_answer(&error_reply, &[]);
                eprintln!("{} {e}", "❌ Error:".red());
                self.sessions.append(&self.key, ChatEntry::assistant(error_reply));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use searchbot_core::config::Config;
    use searchbot_core::types::{ChatRole, LlmResponse, Message, ToolCall, ToolDefinition};
    use searchbot_providers::traits::{LlmProvider, LlmRequestConfig};

    struct ScriptedProvider {
        responses: Mutex<Vec<LlmResponse>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> LlmResponse {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                answer("(no more responses)")
            } else {
                responses.remove(0)
            }
        }

        fn default_model(&self) -> &str {
            "scripted"
        }

        fn display_name(&self) -> &str {
            "ScriptedProvider"
        }
    }

    fn answer(text: &str) -> LlmResponse {
        LlmResponse {
            content: Some(text.into()),
            finish_reason: Some("stop".into()),
            ..Default::default()
        }
    }

    fn console(responses: Vec<LlmResponse>, search: SearchConfig) -> (ConsoleChat, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let sessions = SessionManager::new(Some(dir.path().to_path_buf()), config.chat.clone()).unwrap();
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(responses),
        });
        let agent = SearchAgent::new(provider, config.agent.clone(), search);
        let chat = ConsoleChat::new(agent, sessions, "cli:test".into(), None, 3, false);
        (chat, dir)
    }

    fn offline_search() -> SearchConfig {
        SearchConfig {
            duckduckgo_url: "http://127.0.0.1:1/html/".into(),
            arxiv_api_base: "http://127.0.0.1:1/api/query".into(),
            wikipedia_api_base: "http://127.0.0.1:1/w/api.php".into(),
            timeout_secs: 2,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn ask_records_question_and_answer() {
        let (chat, _dir) = console(vec![answer("Tokio is an async runtime.")], offline_search());

        chat.ask("What is Tokio?").await;

        let transcript = chat.transcript();
        let entries = transcript.conversation();
        assert_eq!(transcript.len(), 3);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, ChatRole::User);
        assert_eq!(entries[0].content, "What is Tokio?");
        assert_eq!(entries[1].role, ChatRole::Assistant);
        assert_eq!(entries[1].content, "Tokio is an async runtime.");
        assert!(entries[1].sources.is_empty());
    }

    #[tokio::test]
    async fn ask_keeps_sources_with_the_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "search": [{ "title": "Tokio (software)" }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": { "1": {
                    "title": "Tokio (software)",
                    "extract": "Tokio is a runtime for Rust."
                } } }
            })))
            .mount(&server)
            .await;

        let search = SearchConfig {
            wikipedia_api_base: server.uri(),
            ..offline_search()
        };
        let call = LlmResponse {
            tool_calls: vec![ToolCall::new("call_1", "wikipedia", r#"{"query":"Tokio"}"#)],
            finish_reason: Some("tool_calls".into()),
            ..Default::default()
        };
        let (chat, _dir) = console(vec![call, answer("Tokio is a Rust runtime [Wikipedia].")], search);

        chat.ask("What is Tokio?").await;

        let transcript = chat.transcript();
        let last = transcript.last().unwrap();
        assert_eq!(last.content, "Tokio is a Rust runtime [Wikipedia].");
        assert_eq!(last.sources.len(), 1);
        assert_eq!(last.sources[0].tool, "Wikipedia");
        assert_eq!(last.sources[0].query, "Tokio");
    }

    #[tokio::test]
    async fn failed_run_stores_the_fixed_error_reply() {
        let (chat, _dir) = console(
            vec![LlmResponse::error("Error calling LLM: 401 Unauthorized")],
            offline_search(),
        );

        chat.ask("What is Tokio?").await;

        let transcript = chat.transcript();
        let entries = transcript.conversation();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "What is Tokio?");
        assert_eq!(entries[1].role, ChatRole::Assistant);
        assert_eq!(entries[1].content, Config::default().chat.error_reply);
        assert!(!entries[1].content.contains("401"));
    }

    #[test]
    fn tool_started_line() {
        colored::control::set_override(false);
        let line = progress_line(
            &AgentEvent::ToolStarted {
                tool: "wikipedia".into(),
                display_name: "Wikipedia".into(),
                query: "Rust".into(),
            },
            false,
        )
        .unwrap();
        assert!(line.contains("Wikipedia: Rust"));
    }

    #[test]
    fn thinking_hidden_unless_enabled() {
        let event = AgentEvent::Thinking {
            text: "let me check".into(),
        };
        assert!(progress_line(&event, false).is_none());
        assert!(progress_line(&event, true).is_some());
    }

    #[test]
    fn successful_tool_and_answer_not_printed() {
        let finished = AgentEvent::ToolFinished {
            tool: "web_search".into(),
            display_name: "Web Search".into(),
            query: "q".into(),
            output: "Title: x".into(),
            is_error: false,
        };
        assert!(progress_line(&finished, true).is_none());
        assert!(progress_line(&AgentEvent::Answer { content: "a".into() }, true).is_none());
    }

    #[test]
    fn failed_tool_line() {
        colored::control::set_override(false);
        let line = progress_line(
            &AgentEvent::ToolFinished {
                tool: "academic_papers".into(),
                display_name: "Academic Papers".into(),
                query: "q".into(),
                output: "Error executing academic_papers: timeout".into(),
                is_error: true,
            },
            false,
        )
        .unwrap();
        assert!(line.contains("Academic Papers failed"));
    }
}
