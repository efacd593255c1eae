//! Axum HTTP surface for the query gateway.
//!
//! The router injects [`GatewayState`] into every handler via
//! [`axum::extract::State`]; graceful shutdown is wired to the shared
//! [`CancellationToken`].
//!
//! ## URL layout
//!
//! ```text
//! GET  /               → service banner
//! GET  /health         → provider + cache summary
//! POST /sample         → canned SearchResponse (shape reference)
//! POST /search-books   → fixed two-stage pipeline
//! POST /searchs/tools  → tool-calling pipeline (looser response contract)
//! ```

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::pipeline::SearchService;

/// Router state injected into every handler. Cheap to clone — all fields
/// are reference-counted.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<SearchService>,
    pub service_name: Arc<str>,
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/sample", post(api::sample))
        .route("/search-books", post(api::search_books))
        .route("/searchs/tools", post(api::search_books_with_tools))
        .with_state(state)
}

/// Bind and serve until the shutdown token is cancelled.
pub async fn serve(
    bind_addr: &str,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("gateway shut down");
    Ok(())
}
