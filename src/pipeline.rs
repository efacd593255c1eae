//! Query orchestration pipeline.
//!
//! [`SearchService`] owns every collaborator for the lifetime of the
//! process and is injected into request handlers via shared state — there
//! are no ambient globals. A request flows through strictly sequential
//! stages; each stage depends on the previous one's output, so there is no
//! fan-out. Suspension points are exactly the outbound network calls.
//!
//! Stage order for [`search_books`](SearchService::search_books):
//! profanity check → keyword extraction (LLM) → cache probe → bibliography
//! search → synthesis (LLM) → parse → detached cache write. A cache hit
//! after extraction short-circuits everything downstream — word-set
//! equivalent queries never re-invoke the bibliography search or the
//! synthesis call.
//!
//! The cache write is the one deliberately decoupled operation: it runs on
//! a detached task, its completion is never awaited, and its failure is
//! only logged. Concurrent requests for equivalent queries may race to
//! write the same key; writes are idempotent per key, so last-write-wins
//! is acceptable and no single-flight deduplication is attempted. Only a
//! successfully parsed synthesis is stored — the degraded fallback would
//! otherwise pin an apology under the key and suppress re-synthesis for
//! every word-set-equivalent query that follows.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bibliography::BibliographyClient;
use crate::cache::{CacheStats, ResponseCache};
use crate::config::Config;
use crate::error::SearchError;
use crate::llm::{Completion, LlmProvider, ModelTier, ProviderError};
use crate::normalize::normalize;
use crate::profanity::Denylist;
use crate::prompts;
use crate::response::{SearchResponse, degraded_response, parse_model_response};

/// Pipeline tuning knobs, split out so tests can use defaults without a
/// full [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum bibliography records per search.
    pub result_limit: u32,
    /// Near-deterministic sampling for keyword extraction.
    pub extract_temperature: f32,
    /// Moderate sampling for synthesis — varies phrasing, not shape.
    pub synth_temperature: f32,
    /// Token cap for the extraction reply (a handful of keywords).
    pub extract_max_tokens: u32,
    /// Token cap for the synthesis reply (a full structured response).
    pub synth_max_tokens: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            result_limit: 5,
            extract_temperature: 0.2,
            synth_temperature: 0.7,
            extract_max_tokens: 50,
            synth_max_tokens: 500,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            result_limit: config.bibliography.limit,
            extract_temperature: config.llm.extract_temperature,
            synth_temperature: config.llm.synth_temperature,
            extract_max_tokens: config.llm.extract_max_tokens,
            synth_max_tokens: config.llm.synth_max_tokens,
        }
    }
}

/// The query-processing service: all collaborators, constructed once.
pub struct SearchService {
    llm: LlmProvider,
    bibliography: BibliographyClient,
    cache: Arc<ResponseCache>,
    denylist: Denylist,
    options: PipelineOptions,
}

impl SearchService {
    pub fn new(
        llm: LlmProvider,
        bibliography: BibliographyClient,
        cache: Arc<ResponseCache>,
        denylist: Denylist,
        options: PipelineOptions,
    ) -> Self {
        Self {
            llm,
            bibliography,
            cache,
            denylist,
            options,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.llm.name()
    }

    pub fn provider_enabled(&self) -> bool {
        self.llm.is_enabled()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub(crate) fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    pub(crate) fn bibliography(&self) -> &BibliographyClient {
        &self.bibliography
    }

    pub(crate) fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub(crate) fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    pub(crate) fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the fixed two-stage pipeline for one query.
    pub async fn search_books(&self, query: &str) -> Result<SearchResponse, SearchError> {
        if self.denylist.contains(query) {
            debug!("query rejected by profanity filter");
            return Err(SearchError::ClientRejection);
        }

        let terms = self.extract_terms(query).await?;
        let key = normalize(&terms);

        if let Some(cached) = self.cache.get(&key).await {
            info!(%key, "cache hit — returning stored response");
            return Ok(cached);
        }

        let records = self
            .bibliography
            .search(&terms, self.options.result_limit)
            .await?;
        if records.is_empty() {
            info!(%terms, "bibliography returned no matches");
            return Err(SearchError::NotFound);
        }

        let prompt = prompts::synthesis_prompt(query, &prompts::format_records(&records));
        let raw = self
            .llm
            .complete(&Completion {
                system: None,
                user: &prompt,
                temperature: self.options.synth_temperature,
                max_tokens: Some(self.options.synth_max_tokens),
                tier: ModelTier::Synthesize,
            })
            .await
            .map_err(map_provider_error)?;

        // A malformed synthesis degrades the response but is never cached:
        // the key must stay open so a later query can re-synthesize.
        let Some(parsed) = parse_model_response(&raw) else {
            return Ok(degraded_response());
        };
        self.store_in_background(key, parsed.clone());
        Ok(parsed)
    }

    /// Keyword extraction: natural-language query → ≤4 search terms.
    /// Extraction failure is fatal for the request — no fallback term
    /// derivation is attempted.
    async fn extract_terms(&self, query: &str) -> Result<String, SearchError> {
        let prompt = prompts::extraction_prompt(query);
        let terms = self
            .llm
            .complete(&Completion {
                system: None,
                user: &prompt,
                temperature: self.options.extract_temperature,
                max_tokens: Some(self.options.extract_max_tokens),
                tier: ModelTier::Extract,
            })
            .await
            .map_err(map_provider_error)?;
        let terms = terms.trim().to_string();
        debug!(%terms, "extracted search terms");
        Ok(terms)
    }

    /// Persist the response without delaying the caller. The task is
    /// unsupervised; `ResponseCache::put` logs its own failures.
    pub(crate) fn store_in_background(&self, key: String, response: SearchResponse) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            cache.put(&key, &response).await;
        });
    }
}

pub(crate) fn map_provider_error(e: ProviderError) -> SearchError {
    match e {
        ProviderError::Disabled => SearchError::ProviderUnavailable,
        other => SearchError::UpstreamUnavailable(format!("llm: {other}")),
    }
}
