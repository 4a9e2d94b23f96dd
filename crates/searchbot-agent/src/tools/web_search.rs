//! Web search via the DuckDuckGo HTML endpoint (no API key required).

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use searchbot_core::utils::{collapse_whitespace, decode_entities, take_chars};

use super::base::{query_schema, require_query, Tool};

/// Returned when the results page has no result links.
pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// One parsed DuckDuckGo result.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

// ─────────────────────────────────────────────
// WebSearchTool
// ─────────────────────────────────────────────

/// General web search for current information.
pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    max_results: usize,
    max_content_chars: usize,
}

impl WebSearchTool {
    pub fn new(client: Client, endpoint: impl Into<String>, max_results: usize, max_content_chars: usize) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_results: max_results.max(1),
            max_content_chars,
        }
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("DuckDuckGo request failed: {e}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("DuckDuckGo search failed with status: {}", resp.status());
        }

        let html = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read DuckDuckGo response: {e}"))?;

        parse_results(&html, self.max_results)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn display_name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Use this for current events, recent \
         developments and general information. Returns titles, links and snippets."
    }

    fn parameters(&self) -> Value {
        query_schema("The web search query")
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = require_query(&params)?;
        debug!(query = %query, max_results = self.max_results, "searching DuckDuckGo");

        let hits = self.search(&query).await?;
        if hits.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let blocks: Vec<String> = hits
            .iter()
            .map(|hit| {
                format!(
                    "Title: {}\nLink: {}\nSnippet: {}",
                    hit.title,
                    hit.link,
                    take_chars(&hit.snippet, self.max_content_chars)
                )
            })
            .collect();

        Ok(blocks.join("\n\n"))
    }
}

// ─────────────────────────────────────────────
// HTML parsing
// ─────────────────────────────────────────────

/// Extract up to `max_results` hits from a DuckDuckGo HTML results page.
///
/// Result links carry class `result__a`; snippets carry `result__snippet`
/// and appear in the same order as their links.
pub fn parse_results(html: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
    let link_regex = Regex::new(
        r#"<a[^>]*class="[^"]*result__a[^"]*"[^>]*href="([^"]+)"[^>]*>([\s\S]*?)</a>"#,
    )?;
    let snippet_regex = Regex::new(r#"<a[^>]*class="result__snippet[^"]*"[^>]*>([\s\S]*?)</a>"#)?;

    let snippets: Vec<String> = snippet_regex
        .captures_iter(html)
        .map(|caps| clean_fragment(&caps[1]))
        .collect();

    let hits = link_regex
        .captures_iter(html)
        .take(max_results)
        .enumerate()
        .map(|(i, caps)| SearchHit {
            title: clean_fragment(&caps[2]),
            link: decode_redirect_url(&decode_entities(&caps[1])),
            snippet: snippets.get(i).cloned().unwrap_or_default(),
        })
        .collect();

    Ok(hits)
}

/// Unwrap DuckDuckGo's `/l/?uddg=<encoded>` redirect links.
pub fn decode_redirect_url(raw_url: &str) -> String {
    if let Some(index) = raw_url.find("uddg=") {
        let encoded = &raw_url[index + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }

    raw_url.to_string()
}

/// Remove tags, decode entities and collapse whitespace in an HTML fragment.
pub fn clean_fragment(fragment: &str) -> String {
    let without_tags = match Regex::new(r"<[^>]+>") {
        Ok(re) => re.replace_all(fragment, "").into_owned(),
        Err(_) => fragment.to_string(),
    };
    collapse_whitespace(&decode_entities(&without_tags))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust <b>Programming</b> Language</a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F">A language empowering everyone to build <b>reliable</b> &amp; efficient software.</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://doc.rust-lang.org/book/">The Rust Programming Language - The Book</a>
  </h2>
  <a class="result__snippet" href="https://doc.rust-lang.org/book/">by Steve Klabnik and Carol Nichols.</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://en.wikipedia.org/wiki/Rust_(programming_language)">Rust (programming language) - Wikipedia</a>
  </h2>
  <a class="result__snippet" href="https://en.wikipedia.org/wiki/Rust_(programming_language)">Rust is a general-purpose programming language.</a>
</div>
"#;

    fn tool(endpoint: &str, max_results: usize) -> WebSearchTool {
        WebSearchTool::new(Client::new(), endpoint, max_results, 500)
    }

    fn query(q: &str) -> HashMap<String, Value> {
        let mut params = HashMap::new();
        params.insert("query".to_string(), json!(q));
        params
    }

    #[test]
    fn test_parse_results() {
        let hits = parse_results(RESULTS_PAGE, 5).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].link, "https://www.rust-lang.org/");
        assert_eq!(
            hits[0].snippet,
            "A language empowering everyone to build reliable & efficient software."
        );
        assert_eq!(hits[1].link, "https://doc.rust-lang.org/book/");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let hits = parse_results(RESULTS_PAGE, 2).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_parse_results_empty_page() {
        let hits = parse_results("<html><body>No results.</body></html>", 3).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_decode_redirect_url() {
        assert_eq!(
            decode_redirect_url("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&rut=x"),
            "https://example.com/a?b=1"
        );
        assert_eq!(decode_redirect_url("https://plain.example"), "https://plain.example");
    }

    #[test]
    fn test_clean_fragment() {
        assert_eq!(clean_fragment("  <b>A</b> &amp;\n  B "), "A & B");
    }

    #[test]
    fn test_definition() {
        let t = tool("http://localhost", 3);
        assert_eq!(t.to_definition().function.name, "web_search");
        assert_eq!(t.display_name(), "Web Search");
    }

    #[tokio::test]
    async fn test_execute_formats_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "rust language"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let out = tool(&format!("{}/html/", server.uri()), 2)
            .execute(query("rust language"))
            .await
            .unwrap();

        assert!(out.starts_with("Title: Rust Programming Language\nLink: https://www.rust-lang.org/"));
        assert!(out.contains("Title: The Rust Programming Language - The Book"));
        assert!(!out.contains("Wikipedia"));
        assert_eq!(out.matches("Title: ").count(), 2);
    }

    #[tokio::test]
    async fn test_execute_caps_snippets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .mount(&server)
            .await;

        let t = WebSearchTool::new(Client::new(), server.uri(), 1, 10);
        let out = t.execute(query("rust")).await.unwrap();
        assert!(out.ends_with("Snippet: A language"));
    }

    #[tokio::test]
    async fn test_execute_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let out = tool(&server.uri(), 3).execute(query("zzzz")).await.unwrap();
        assert_eq!(out, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_execute_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = tool(&server.uri(), 3).execute(query("rust")).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_execute_missing_query() {
        let err = tool("http://127.0.0.1:1", 3)
            .execute(HashMap::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
