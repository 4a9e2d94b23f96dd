//! The chat page, embedded at compile time.

use axum::response::Html;
use axum::{routing::get, Router};

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub fn page_routes() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_page() {
        let Html(page) = index().await;
        assert!(page.contains("<title>AI Search Assistant</title>"));
        assert!(page.contains("/api/status"));
    }

    #[tokio::test]
    async fn test_index_page_reports_failed_requests() {
        let Html(page) = index().await;
        assert!(page.contains("catch (err)"));
        assert!(page.contains("\"Request failed: \" + err.message"));
    }
}
