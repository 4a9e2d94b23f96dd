//! Agent loop: the LLM ↔ tool-calling main loop.
//!
//! One `run` answers one user query: build the prompt, let the model call
//! the search tools until it answers or the iteration cap is reached, then
//! return the answer with the sources it consulted.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use searchbot_core::config::{AgentSettings, SearchConfig};
use searchbot_core::types::{ChatEntry, LlmResponse, Message, Source, UsageInfo};
use searchbot_core::utils::truncate_string;
use searchbot_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::{ContextBuilder, FINAL_ANSWER_INSTRUCTION};
use crate::events::{AgentEvent, AgentObserver};
use crate::tools::{build_search_tools, search_client, ToolRegistry};

/// Characters of tool output kept in step logs and source excerpts.
const EXCERPT_CHARS: usize = 300;

/// Answer used when the model returns nothing but whitespace.
const EMPTY_ANSWER: &str = "I could not produce an answer from the available sources.";

// ─────────────────────────────────────────────
// Request / reply
// ─────────────────────────────────────────────

/// One user query plus per-request overrides.
#[derive(Clone, Debug, Default)]
pub struct AgentRequest {
    pub question: String,
    /// Overrides `AgentSettings::model`.
    pub model: Option<String>,
    /// Overrides `SearchConfig::max_results` (clamped to 1–5).
    pub max_results: Option<u32>,
    /// Earlier transcript entries; sent only when `includeHistory` is on.
    pub history: Vec<ChatEntry>,
}

impl AgentRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}

/// The outcome of a successful run.
#[derive(Clone, Debug, Serialize)]
pub struct AgentReply {
    pub content: String,
    pub sources: Vec<Source>,
    pub steps: Vec<AgentEvent>,
    pub model: String,
    pub usage: UsageInfo,
}

// ─────────────────────────────────────────────
// SearchAgent
// ─────────────────────────────────────────────

/// Answers queries with an LLM that can call the web, arXiv and Wikipedia.
pub struct SearchAgent {
    provider: Arc<dyn LlmProvider>,
    settings: AgentSettings,
    search: SearchConfig,
    client: reqwest::Client,
    context: ContextBuilder,
}

impl SearchAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: AgentSettings, search: SearchConfig) -> Self {
        let client = search_client(&search);
        let context = ContextBuilder::new(settings.prompt_style);

        info!(
            provider = provider.display_name(),
            model = %settings.model,
            max_iterations = settings.max_iterations,
            "search agent initialized"
        );

        Self {
            provider,
            settings,
            search,
            client,
            context,
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// The default model name.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Tool registry configured for `max_results` documents per source.
    pub fn tools(&self, max_results: u32) -> ToolRegistry {
        build_search_tools(&self.search, max_results, self.client.clone())
    }

    /// Answer one query.
    ///
    /// Provider failures abort the run with `Err`; tool failures are handed
    /// back to the model as error strings.
    pub async fn run(&self, request: AgentRequest, observer: &dyn AgentObserver) -> Result<AgentReply> {
        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.model.clone());
        let max_results =
            SearchConfig::clamp_results(request.max_results.unwrap_or(self.search.max_results));

        let tools = self.tools(max_results);
        let tool_defs = tools.get_definitions();
        let request_config = LlmRequestConfig::from(&self.settings);

        let history: &[ChatEntry] = if self.settings.include_history {
            &request.history
        } else {
            &[]
        };
        let mut messages =
            self.context
                .build_messages(history, &request.question, &model, max_results);

        let mut run = RunState::new(observer);
        let mut final_content: Option<String> = None;

        info!(model = %model, max_results = max_results, "agent run started");

        for iteration in 0..self.settings.max_iterations {
            debug!(iteration = iteration, "LLM call");

            let response = self
                .provider
                .chat(&messages, Some(&tool_defs), &model, &request_config)
                .await;
            let visible = run.absorb(response.clone())?;

            if response.has_tool_calls() {
                ContextBuilder::add_assistant_message(
                    &mut messages,
                    visible.filter(|v| !v.is_empty()),
                    response.tool_calls.clone(),
                );

                for tc in &response.tool_calls {
                    info!(tool = %tc.function.name, iteration = iteration, "executing tool call");
                    let result = run.call_tool(&tools, &tc.function.name, &tc.function.arguments).await;
                    ContextBuilder::add_tool_result(&mut messages, &tc.id, &result);
                }
            } else {
                final_content = Some(visible.unwrap_or_default());
                break;
            }
        }

        // Iteration cap reached: one more call, no tools, answer from what we have.
        let content = match final_content {
            Some(content) => content,
            None => {
                warn!(max_iterations = self.settings.max_iterations, "iteration limit reached");
                run.emit(AgentEvent::IterationLimit {
                    iterations: self.settings.max_iterations,
                });
                messages.push(Message::user(FINAL_ANSWER_INSTRUCTION));
                let response = self
                    .provider
                    .chat(&messages, None, &model, &request_config)
                    .await;
                run.absorb(response)?.unwrap_or_default()
            }
        };

        let content = if content.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            content
        };
        run.emit(AgentEvent::Answer {
            content: content.clone(),
        });

        info!(
            sources = run.sources.len(),
            total_tokens = run.usage.total_tokens,
            "agent run finished"
        );

        Ok(AgentReply {
            content,
            sources: run.sources,
            steps: run.steps,
            model,
            usage: run.usage,
        })
    }
}

// ─────────────────────────────────────────────
// Per-run bookkeeping
// ─────────────────────────────────────────────

struct RunState<'a> {
    observer: &'a dyn AgentObserver,
    steps: Vec<AgentEvent>,
    sources: Vec<Source>,
    usage: UsageInfo,
}

impl<'a> RunState<'a> {
    fn new(observer: &'a dyn AgentObserver) -> Self {
        Self {
            observer,
            steps: Vec::new(),
            sources: Vec::new(),
            usage: UsageInfo::default(),
        }
    }

    fn emit(&mut self, event: AgentEvent) {
        self.observer.on_event(&event);
        self.steps.push(event);
    }

    /// Record usage and reasoning from a response; returns the visible text.
    fn absorb(&mut self, response: LlmResponse) -> Result<Option<String>> {
        if response.is_error() {
            let msg = response.content.unwrap_or_else(|| "LLM call failed".to_string());
            anyhow::bail!(msg);
        }
        if let Some(usage) = &response.usage {
            self.usage.add(usage);
        }
        if let Some(reasoning) = response.reasoning_content.filter(|r| !r.trim().is_empty()) {
            self.emit(AgentEvent::Thinking {
                text: reasoning.trim().to_string(),
            });
        }

        Ok(response.content.map(|content| {
            let (answer, thoughts) = split_thinking(&content);
            for text in thoughts {
                self.emit(AgentEvent::Thinking { text });
            }
            answer
        }))
    }

    /// Run one tool call and record it; returns what the model gets back.
    async fn call_tool(&mut self, tools: &ToolRegistry, name: &str, arguments: &str) -> String {
        let display_name = tools.display_name(name);

        let params = match parse_arguments(arguments) {
            Ok(params) => params,
            Err(e) => {
                warn!(tool = name, error = %e, "malformed tool arguments");
                let result = format!(
                    "Error: could not parse arguments for {name}: {e}. \
                     Call the tool again with a JSON object such as {{\"query\": \"...\"}}."
                );
                self.emit(AgentEvent::ToolFinished {
                    tool: name.to_string(),
                    display_name,
                    query: String::new(),
                    output: result.clone(),
                    is_error: true,
                });
                return result;
            }
        };

        let query = params
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        self.emit(AgentEvent::ToolStarted {
            tool: name.to_string(),
            display_name: display_name.clone(),
            query: query.clone(),
        });

        let result = tools.execute(name, params).await;
        let is_error = result.starts_with("Error");
        let excerpt = truncate_string(&result, EXCERPT_CHARS);

        debug!(tool = name, result_len = result.len(), is_error = is_error, "tool result");

        if !is_error && !is_empty_result(&result) {
            self.sources.push(Source {
                tool: display_name.clone(),
                query: query.clone(),
                excerpt: excerpt.clone(),
            });
        }

        self.emit(AgentEvent::ToolFinished {
            tool: name.to_string(),
            display_name,
            query,
            output: excerpt,
            is_error,
        });

        result
    }
}

/// Parse a tool call's JSON arguments; blank input counts as `{}`.
fn parse_arguments(arguments: &str) -> Result<HashMap<String, Value>, serde_json::Error> {
    if arguments.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(arguments)
}

/// The "nothing found" texts the search tools return.
fn is_empty_result(result: &str) -> bool {
    result.starts_with("No good ")
}

/// Split `<think>…</think>` blocks out of model output.
///
/// Returns the remaining answer text (trimmed) and the non-empty thoughts.
/// A closing tag with no opening tag marks everything before it as thought;
/// an unclosed opening tag marks everything after it.
pub fn split_thinking(content: &str) -> (String, Vec<String>) {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut answer = String::new();
    let mut thoughts = Vec::new();
    let mut rest = content;

    loop {
        match (rest.find(OPEN), rest.find(CLOSE)) {
            (Some(open), Some(close)) if open < close => {
                answer.push_str(&rest[..open]);
                thoughts.push(rest[open + OPEN.len()..close].trim().to_string());
                rest = &rest[close + CLOSE.len()..];
            }
            (_, Some(close)) => {
                thoughts.push(rest[..close].trim().to_string());
                rest = &rest[close + CLOSE.len()..];
            }
            (Some(open), None) => {
                answer.push_str(&rest[..open]);
                thoughts.push(rest[open + OPEN.len()..].trim().to_string());
                break;
            }
            (None, None) => {
                answer.push_str(rest);
                break;
            }
        }
    }

    thoughts.retain(|t| !t.is_empty());
    (answer.trim().to_string(), thoughts)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
