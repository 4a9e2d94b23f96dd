//! Lookup tools the agent can call: web search, arXiv and Wikipedia.

pub mod arxiv;
pub mod base;
pub mod registry;
pub mod web_search;
pub mod wikipedia;

use std::sync::Arc;
use std::time::Duration;

use searchbot_core::config::SearchConfig;
use tracing::warn;

pub use arxiv::ArxivTool;
pub use base::{query_schema, require_query, require_string, Tool};
pub use registry::ToolRegistry;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

/// HTTP client shared by the search tools (user agent + per-request timeout).
pub fn search_client(config: &SearchConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default search client");
            reqwest::Client::new()
        })
}

/// Registry holding the three search tools, each returning up to
/// `max_results` documents.
pub fn build_search_tools(
    config: &SearchConfig,
    max_results: u32,
    client: reqwest::Client,
) -> ToolRegistry {
    let max_results = SearchConfig::clamp_results(max_results) as usize;
    let max_chars = config.max_content_chars;

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(WebSearchTool::new(
        client.clone(),
        config.duckduckgo_url.as_str(),
        max_results,
        max_chars,
    )));
    tools.register(Arc::new(ArxivTool::new(
        client.clone(),
        config.arxiv_api_base.as_str(),
        max_results,
        max_chars,
    )));
    tools.register(Arc::new(WikipediaTool::new(
        client,
        config.wikipedia_api_base.as_str(),
        max_results,
        max_chars,
    )));
    tools
}
