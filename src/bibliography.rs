//! Bibliography search client — Open Library adapter.
//!
//! `search(terms, limit)` queries the external book-search API and maps raw
//! records into the uniform [`BookRecord`] shape. Mapping is defensive:
//! every missing field defaults to the `"n/a"` sentinel, multi-valued
//! fields are joined with `", "`, and `subject` is truncated to its first
//! five entries.
//!
//! Network and non-2xx failures propagate as
//! [`SearchError::UpstreamUnavailable`] — an empty result set is
//! semantically different from a lookup failure, and callers must be able
//! to tell them apart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::BibliographyConfig;
use crate::error::{AppError, SearchError};
use crate::response::BookRecord;

const SENTINEL: &str = "n/a";
const MAX_SUBJECTS: usize = 5;
const SEARCH_FIELDS: &str = "key,title,author_name,first_publish_year,subject";

/// Backend selector. `Fixed` serves canned records for offline tests and
/// counts invocations so tests can assert short-circuit behavior.
#[derive(Debug)]
pub enum BibliographyClient {
    Http(OpenLibraryClient),
    Fixed(FixedBibliography),
}

impl BibliographyClient {
    pub fn open_library(config: &BibliographyConfig) -> Result<Self, AppError> {
        Ok(Self::Http(OpenLibraryClient::new(
            config.api_url.clone(),
            config.timeout_seconds,
        )?))
    }

    pub fn fixed(records: Vec<BookRecord>) -> Self {
        Self::Fixed(FixedBibliography::new(records))
    }

    /// Ordered search results for `terms`, at most `limit` records.
    pub async fn search(&self, terms: &str, limit: u32) -> Result<Vec<BookRecord>, SearchError> {
        match self {
            Self::Http(client) => client.search(terms, limit).await,
            Self::Fixed(fixed) => fixed.search(limit),
        }
    }
}

// ── HTTP client ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: Client,
    api_url: String,
}

impl OpenLibraryClient {
    pub fn new(api_url: String, timeout_seconds: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build bibliography client: {e}")))?;
        Ok(Self { client, api_url })
    }

    async fn search(&self, terms: &str, limit: u32) -> Result<Vec<BookRecord>, SearchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", terms),
                ("lang", "en"),
                ("limit", &limit.to_string()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_url, error = %e, "bibliography request failed (transport)");
                SearchError::UpstreamUnavailable(format!("bibliography search: {e}"))
            })?;

        let response = response.error_for_status().map_err(|e| {
            error!(url = %self.api_url, error = %e, "bibliography request returned HTTP error");
            SearchError::UpstreamUnavailable(format!("bibliography search: {e}"))
        })?;

        let page = response.json::<SearchPage>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize bibliography response");
            SearchError::UpstreamUnavailable(format!("bibliography response: {e}"))
        })?;

        debug!(%terms, docs = page.docs.len(), "bibliography search complete");
        Ok(page.docs.into_iter().map(map_doc).collect())
    }
}

// ── Fixed client (tests) ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FixedBibliography {
    records: Vec<BookRecord>,
    fail: bool,
    calls: Arc<AtomicU64>,
}

impl FixedBibliography {
    pub fn new(records: Vec<BookRecord>) -> Self {
        Self {
            records,
            fail: false,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Every search fails with `UpstreamUnavailable`.
    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter handle — keep a clone before moving the client into
    /// the service, then assert on invocation counts.
    pub fn call_counter(&self) -> Arc<AtomicU64> {
        self.calls.clone()
    }

    fn search(&self, limit: u32) -> Result<Vec<BookRecord>, SearchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(SearchError::UpstreamUnavailable(
                "bibliography search: scripted failure".into(),
            ));
        }
        Ok(self.records.iter().take(limit as usize).cloned().collect())
    }
}

// ── Wire types & mapping ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    docs: Vec<RawDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Option<Vec<String>>,
    // Number in practice, but tolerate a string.
    #[serde(default)]
    first_publish_year: Option<serde_json::Value>,
    #[serde(default)]
    subject: Option<Vec<String>>,
}

fn map_doc(doc: RawDoc) -> BookRecord {
    let author = doc
        .author_name
        .filter(|names| !names.is_empty())
        .map(|names| names.join(", "))
        .unwrap_or_else(|| SENTINEL.to_string());

    let published_year = match doc.first_publish_year {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        _ => SENTINEL.to_string(),
    };

    let subject = doc
        .subject
        .filter(|subjects| !subjects.is_empty())
        .map(|subjects| {
            subjects
                .into_iter()
                .take(MAX_SUBJECTS)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| SENTINEL.to_string());

    BookRecord {
        title: doc.title.unwrap_or_else(|| SENTINEL.to_string()),
        author,
        published_year,
        subject,
    }
}
