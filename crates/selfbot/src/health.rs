//! Liveness endpoint for the hosting platform.

use axum::{http::StatusCode, routing::get, Router};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const HEALTH_PATH: &str = "/health";

/// Router answering only the health check.
pub fn create_router() -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Serve the health router until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router())
        .with_graceful_shutdown(shutdown)
        .await
}
