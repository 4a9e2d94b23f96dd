use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assets::page_routes;
use crate::routes::{chat_routes, health_routes, status_routes};
use crate::state::AppState;
use crate::{Result, WebError};

const MAX_BODY_SIZE_64KB: usize = 64 * 1024;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let port = state.config.web.port;
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(chat_routes())
        .merge(status_routes())
        .with_state(state)
        .merge(health_routes())
        .merge(page_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_64KB))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| WebError::Config(format!("Invalid address: {e}")))?;

    let app = build_router(state);

    info!("Starting web chat on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
