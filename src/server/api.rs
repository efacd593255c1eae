//! Axum handlers for the gateway routes.
//!
//! Each handler receives [`GatewayState`] via [`axum::extract::State`] and
//! maps [`SearchError`] variants onto HTTP status classes. The two search
//! entry points keep independent error semantics: only the tools path
//! reports an uninitialized provider as 503.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::SearchError;
use crate::response::{BookItem, SearchResponse};
use crate::toolflow::ToolSearchOutcome;

use super::GatewayState;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct SearchRequest {
    query: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "This is a book search API service" }))
}

/// GET /health
pub(super) async fn health(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    let stats = state.service.cache_stats();
    Json(json!({
        "status": "ok",
        "service": &*state.service_name,
        "llm_provider": state.service.provider_name(),
        "cache": { "hits": stats.hits, "misses": stats.misses },
    }))
}

/// POST /sample — canned response showing the structured shape.
pub(super) async fn sample() -> Json<SearchResponse> {
    Json(SearchResponse {
        greeting: "Hello! Here are some books you might like:".to_string(),
        books: vec![
            BookItem {
                title: "The Great Gatsby".to_string(),
                author: "F. Scott Fitzgerald".to_string(),
                description: "A classic novel set in the Roaring Twenties.".to_string(),
            },
            BookItem {
                title: "To Kill a Mockingbird".to_string(),
                author: "Harper Lee".to_string(),
                description: "A novel about racial injustice in the Deep South.".to_string(),
            },
        ],
        conclusion: "Let me know if you need more recommendations!".to_string(),
    })
}

/// POST /search-books — fixed two-stage pipeline.
pub(super) async fn search_books(
    State(state): State<GatewayState>,
    Json(req): Json<SearchRequest>,
) -> Response {
    match state.service.search_books(&req.query).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => search_error_response(e, false),
    }
}

/// POST /searchs/tools — tool-calling pipeline.
///
/// Returns either a structured `SearchResponse` body or, when the model
/// declined the search tool, a bare single-element array of raw text —
/// callers must handle both shapes.
pub(super) async fn search_books_with_tools(
    State(state): State<GatewayState>,
    Json(req): Json<SearchRequest>,
) -> Response {
    match state.service.search_books_with_tools(&req.query).await {
        Ok(ToolSearchOutcome::Structured(response)) => {
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(ToolSearchOutcome::Raw(messages)) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => search_error_response(e, true),
    }
}

/// Map a pipeline error onto an HTTP response.
///
/// `tools_path` selects the 503 semantics for an uninitialized provider;
/// the fixed pipeline folds that case into the generic 500 instead.
fn search_error_response(e: SearchError, tools_path: bool) -> Response {
    match e {
        SearchError::ClientRejection => {
            (StatusCode::BAD_REQUEST, json_error("profanity", e)).into_response()
        }
        SearchError::NotFound => (StatusCode::NOT_FOUND, json_error("not_found", e)).into_response(),
        SearchError::ProviderUnavailable if tools_path => {
            (StatusCode::SERVICE_UNAVAILABLE, json_error("llm_unavailable", e)).into_response()
        }
        SearchError::ProviderUnavailable | SearchError::UpstreamUnavailable(_) => {
            warn!("search request failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json_error(
                    "internal",
                    "An unexpected error occurred while processing your request. Please try again later.",
                ),
            )
                .into_response()
        }
    }
}
