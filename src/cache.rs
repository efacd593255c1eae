//! Response cache — key/value store addressed by normalized search terms.
//!
//! Two backends behind one enum: an in-process map (default, also used in
//! tests) and a document-style HTTP store that keeps each response under a
//! nested `response` field.
//!
//! Failure semantics per the pipeline's needs: `get` never raises — a
//! transport failure is logged and reported as a miss; `put` failures are
//! logged and dropped. The orchestrator issues `put` from a detached task,
//! so nothing on the write path can delay or fail a response. Entries are
//! written once per key and never updated; concurrent writers racing on the
//! same key produce equivalent values, so last-write-wins is fine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::AppError;
use crate::response::SearchResponse;

/// Hit/miss counters exposed on the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub enum ResponseCache {
    Memory(MemoryCache),
    Http(HttpCache),
}

impl ResponseCache {
    pub fn from_config(config: &CacheConfig) -> Result<Self, AppError> {
        match config.backend.as_str() {
            "memory" => Ok(Self::memory()),
            "http" => {
                let url = config.api_url.clone().ok_or_else(|| {
                    AppError::Config("[cache] api_url is required when backend = \"http\"".into())
                })?;
                Ok(Self::Http(HttpCache::new(url)?))
            }
            other => Err(AppError::Config(format!("unknown cache backend: {other}"))),
        }
    }

    pub fn memory() -> Self {
        Self::Memory(MemoryCache::default())
    }

    /// Look up a cached response. A missing key and a transport failure
    /// both come back as `None`; only the latter is logged.
    pub async fn get(&self, key: &str) -> Option<SearchResponse> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::Http(store) => store.get(key).await,
        }
    }

    /// Store a response. Failures are logged, never surfaced.
    pub async fn put(&self, key: &str, value: &SearchResponse) {
        match self {
            Self::Memory(store) => store.put(key, value).await,
            Self::Http(store) => store.put(key, value).await,
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self {
            Self::Memory(store) => store.stats.snapshot(),
            Self::Http(store) => store.stats.snapshot(),
        }
    }
}

// ── Counters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

// ── In-memory backend ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: tokio::sync::RwLock<HashMap<String, SearchResponse>>,
    stats: Counters,
}

impl MemoryCache {
    async fn get(&self, key: &str) -> Option<SearchResponse> {
        let found = self.entries.read().await.get(key).cloned();
        match &found {
            Some(_) => self.stats.hit(),
            None => self.stats.miss(),
        }
        found
    }

    async fn put(&self, key: &str, value: &SearchResponse) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
    }
}

// ── HTTP document-store backend ───────────────────────────────────────────────

/// Document wrapper: the store keeps the response under a nested field.
#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    response: SearchResponse,
}

#[derive(Debug)]
pub struct HttpCache {
    client: Client,
    api_url: String,
    stats: Counters,
}

impl HttpCache {
    pub fn new(api_url: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build cache client: {e}")))?;
        Ok(Self {
            client,
            api_url,
            stats: Counters::default(),
        })
    }

    fn document_url(&self, key: &str) -> String {
        format!("{}/{key}", self.api_url.trim_end_matches('/'))
    }

    async fn get(&self, key: &str) -> Option<SearchResponse> {
        let url = self.document_url(key);
        let result = self.client.get(&url).send().await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                // Store unreachable — treat as a miss, never fail the request.
                warn!(%key, error = %e, "cache get failed — treating as miss");
                self.stats.miss();
                return None;
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            self.stats.miss();
            return None;
        }

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(%key, error = %e, "cache get returned HTTP error — treating as miss");
                self.stats.miss();
                return None;
            }
        };

        match response.json::<CacheDocument>().await {
            Ok(doc) => {
                self.stats.hit();
                Some(doc.response)
            }
            Err(e) => {
                warn!(%key, error = %e, "cache entry failed to decode — treating as miss");
                self.stats.miss();
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &SearchResponse) {
        let url = self.document_url(key);
        let document = CacheDocument {
            response: value.clone(),
        };
        match self.client.put(&url).json(&document).send().await {
            Ok(response) => {
                if let Err(e) = response.error_for_status() {
                    warn!(%key, error = %e, "cache store rejected write");
                } else {
                    debug!(%key, "cached response stored");
                }
            }
            Err(e) => warn!(%key, error = %e, "cache write failed"),
        }
    }
}
