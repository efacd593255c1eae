//! Application-wide error types.
//!
//! Two layers, kept separate on purpose:
//!
//! - [`AppError`] — startup and infrastructure failures. Fatal: the service
//!   refuses to start or a channel tears down.
//! - [`SearchError`] — per-request pipeline outcomes that terminate a search
//!   early. Each variant maps to one HTTP status class at the server edge.
//!
//! Malformed model output and cache transport failures never appear here:
//! the response parser substitutes a fixed degraded response, and the cache
//! client degrades to a miss (read) or a logged drop (write).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Early-termination outcomes of the query pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query tripped the profanity denylist. No further stage runs.
    #[error("query contains profanity or other inappropriate content")]
    ClientRejection,

    /// Bibliography search returned zero records — distinct from a lookup failure.
    #[error("no books found matching the query")]
    NotFound,

    /// LLM or bibliography transport failure (connection, timeout, non-2xx).
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The LLM provider was never initialized (tool path reports this as 503).
    #[error("llm provider is not configured")]
    ProviderUnavailable,
}
