//! Encyclopedia lookup via the MediaWiki API.
//!
//! Two requests per query: a title search (`list=search`) and then the
//! plain-text intro of each matched page (`prop=extracts`).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use searchbot_core::utils::take_chars;

use super::base::{query_schema, require_query, Tool};

/// Returned when the search matches no page with text.
pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Queries longer than this are cut before being sent.
pub const MAX_QUERY_CHARS: usize = 300;

// ─────────────────────────────────────────────
// WikipediaTool
// ─────────────────────────────────────────────

/// Looks up encyclopedia summaries for people, places, concepts and history.
pub struct WikipediaTool {
    client: Client,
    api_base: String,
    max_results: usize,
    max_content_chars: usize,
}

impl WikipediaTool {
    pub fn new(client: Client, api_base: impl Into<String>, max_results: usize, max_content_chars: usize) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            max_results: max_results.max(1),
            max_content_chars,
        }
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> anyhow::Result<Value> {
        let resp = self
            .client
            .get(&self.api_base)
            .query(params)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Wikipedia request failed: {e}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("Wikipedia API returned status: {}", resp.status());
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse Wikipedia response: {e}"))?;

        if let Some(info) = body["error"]["info"].as_str() {
            anyhow::bail!("Wikipedia API error: {info}");
        }
        Ok(body)
    }

    /// Titles of the best-matching pages, in rank order.
    async fn search_titles(&self, query: &str) -> anyhow::Result<Vec<String>> {
        let limit = self.max_results.to_string();
        let body = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .await?;

        Ok(body["query"]["search"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|h| h["title"].as_str().map(String::from))
                    .take(self.max_results)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Plain-text intro extract for each title that has one.
    async fn fetch_extracts(&self, titles: &[String]) -> anyhow::Result<HashMap<String, String>> {
        let joined = titles.join("|");
        let body = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
                ("redirects", "1"),
                ("titles", joined.as_str()),
                ("format", "json"),
            ])
            .await?;

        let mut extracts = HashMap::new();
        if let Some(pages) = body["query"]["pages"].as_object() {
            for page in pages.values() {
                let (Some(title), Some(extract)) = (page["title"].as_str(), page["extract"].as_str()) else {
                    continue;
                };
                let extract = extract.trim();
                if !extract.is_empty() {
                    extracts.insert(title.to_string(), extract.to_string());
                }
            }
        }
        Ok(extracts)
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn display_name(&self) -> &str {
        "Wikipedia"
    }

    fn description(&self) -> &str {
        "Look up Wikipedia for general knowledge about people, places, companies, \
         historical events and concepts. Returns page titles with their summaries."
    }

    fn parameters(&self) -> Value {
        query_schema("The topic to look up on Wikipedia")
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = take_chars(&require_query(&params)?, MAX_QUERY_CHARS);
        debug!(query = %query, max_results = self.max_results, "searching Wikipedia");

        let titles = self.search_titles(&query).await?;
        if titles.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let extracts = self.fetch_extracts(&titles).await?;
        let blocks: Vec<String> = titles
            .iter()
            .filter_map(|title| {
                extracts
                    .get(title)
                    .map(|summary| format!("Page: {title}\nSummary: {summary}"))
            })
            .collect();

        if blocks.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(take_chars(&blocks.join("\n\n"), self.max_content_chars))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
