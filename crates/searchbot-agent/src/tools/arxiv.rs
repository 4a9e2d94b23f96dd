//! Academic paper lookup via the arXiv Atom API.

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use searchbot_core::utils::{collapse_whitespace, decode_entities, take_chars};

use super::base::{query_schema, require_query, Tool};

/// Returned when the feed has no entries.
pub const NO_RESULTS: &str = "No good Arxiv Result was found";

/// Queries longer than this are cut before being sent.
pub const MAX_QUERY_CHARS: usize = 300;

/// One paper parsed from the Atom feed.
#[derive(Clone, Debug, PartialEq)]
pub struct Paper {
    /// `YYYY-MM-DD`
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

impl Paper {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

// ─────────────────────────────────────────────
// ArxivTool
// ─────────────────────────────────────────────

/// Searches arXiv for scientific and technical papers.
pub struct ArxivTool {
    client: Client,
    api_base: String,
    max_results: usize,
    max_content_chars: usize,
}

impl ArxivTool {
    pub fn new(client: Client, api_base: impl Into<String>, max_results: usize, max_content_chars: usize) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            max_results: max_results.max(1),
            max_content_chars,
        }
    }

    async fn fetch_feed(&self, query: &str) -> anyhow::Result<String> {
        let max_results = self.max_results.to_string();
        let mut request = self.client.get(&self.api_base);
        request = if is_arxiv_identifier(query) {
            let ids = query.split_whitespace().collect::<Vec<_>>().join(",");
            request.query(&[("id_list", ids.as_str()), ("max_results", max_results.as_str())])
        } else {
            request.query(&[("search_query", query), ("max_results", max_results.as_str())])
        };

        let resp = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("arXiv request failed: {e}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("arXiv API returned status: {}", resp.status());
        }

        resp.text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read arXiv response: {e}"))
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "academic_papers"
    }

    fn display_name(&self) -> &str {
        "Academic Papers"
    }

    fn description(&self) -> &str {
        "Search arXiv for scientific and technical papers in physics, mathematics, \
         computer science, biology, finance and statistics. Accepts keywords or \
         arXiv identifiers such as 1706.03762."
    }

    fn parameters(&self) -> Value {
        query_schema("Keywords or arXiv identifiers to look up")
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = take_chars(&require_query(&params)?, MAX_QUERY_CHARS);
        debug!(query = %query, max_results = self.max_results, "querying arXiv");

        let feed = self.fetch_feed(&query).await?;
        let papers = parse_feed(&feed)?;
        if papers.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let blocks: Vec<String> = papers
            .iter()
            .take(self.max_results)
            .map(Paper::render)
            .collect();

        Ok(take_chars(&blocks.join("\n\n"), self.max_content_chars))
    }
}

// ─────────────────────────────────────────────
// Atom parsing
// ─────────────────────────────────────────────

/// Whether every whitespace-separated word is an arXiv identifier
/// (`1706.03762`, `2101.00001v2`, or old-style `0704001`).
pub fn is_arxiv_identifier(query: &str) -> bool {
    let Ok(id) = Regex::new(r"^(\d{2}(0[1-9]|1[0-2])\.\d{4,5}(v\d+)?|\d{7}.*)$") else {
        return false;
    };
    let mut words = query.split_whitespace().peekable();
    words.peek().is_some() && words.all(|w| id.is_match(w))
}

/// Parse the entries of an arXiv Atom feed.
///
/// The API reports bad queries as a single entry whose id points at
/// `/api/errors`; that becomes an `Err`.
pub fn parse_feed(feed: &str) -> anyhow::Result<Vec<Paper>> {
    let entry_re = Regex::new(r"(?s)<entry>(.*?)</entry>")?;
    let author_re = Regex::new(r"(?s)<author>\s*<name>(.*?)</name>")?;

    let mut papers = Vec::new();
    for caps in entry_re.captures_iter(feed) {
        let entry = &caps[1];

        let id = tag_text(entry, "id")?.unwrap_or_default();
        let summary = tag_text(entry, "summary")?.unwrap_or_default();
        if id.contains("/api/errors") {
            warn!(error = %summary, "arXiv rejected the query");
            anyhow::bail!("arXiv API error: {summary}");
        }

        let published = tag_text(entry, "published")?
            .map(|p| take_chars(&p, 10))
            .unwrap_or_default();
        let title = tag_text(entry, "title")?.unwrap_or_default();
        let authors = author_re
            .captures_iter(entry)
            .map(|a| clean(&a[1]))
            .collect();

        papers.push(Paper {
            published,
            title,
            authors,
            summary,
        });
    }

    Ok(papers)
}

/// Text content of the first `<tag>` element, cleaned.
fn tag_text(block: &str, tag: &str) -> anyhow::Result<Option<String>> {
    let re = Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>"))?;
    Ok(re.captures(block).map(|c| clean(&c[1])))
}

fn clean(text: &str) -> String {
    collapse_whitespace(&decode_entities(text))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
