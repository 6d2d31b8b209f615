//! `autodev-server` — HTTP surface for the autodev agents.
//!
//! Three routes: `POST /code` runs the code agent for an issue,
//! `POST /review` runs the reviewer and publishes its verdict,
//! `GET /health` is a liveness probe. Run failures are reported inside the
//! JSON body; only precondition failures (missing workspace, bad input) use
//! HTTP error statuses.

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use state::AppState;

/// Build the axum router with all routes and middleware. Used by `serve()`
/// and by integration tests.
pub fn build_router(workspace: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/code", post(routes::code))
        .route("/review", post(routes::review))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(AppState::new(workspace))
}

/// Bind and serve until the process is terminated.
pub async fn serve(host: &str, port: u16, workspace: Option<PathBuf>) -> anyhow::Result<()> {
    let router = build_router(workspace);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "autodev server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
