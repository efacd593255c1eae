//! Tool-calling pipeline — the model decides when to search.
//!
//! Alternative entry point to the fixed pipeline in `pipeline.rs`: a single
//! tool-enabled completion exposes `search_open_library` and forces the
//! model to pick a capability. The model both decides relevance and
//! supplies the search terms, which may differ from what the fixed
//! extraction prompt would produce.
//!
//! The response contract is deliberately looser than the fixed pipeline's:
//! when the model elects not to call the tool, its raw text is returned
//! wrapped as a single-element sequence, and callers must handle both
//! shapes.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::llm::{Completion, ModelTier, ToolOutcome};
use crate::normalize::normalize;
use crate::pipeline::{SearchService, map_provider_error};
use crate::prompts;
use crate::response::{SearchResponse, degraded_response, parse_model_response};

/// Outcome of the tool-calling pipeline — two distinct response shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolSearchOutcome {
    /// The model called the search tool; the result follows the structured
    /// response contract.
    Structured(SearchResponse),
    /// The model answered directly; raw text wrapped as a single-element
    /// sequence.
    Raw(Vec<String>),
}

/// Arguments the model supplies when invoking `search_open_library`.
#[derive(Debug, Deserialize)]
struct SearchToolArgs {
    search_terms: String,
}

impl SearchService {
    /// Run the tool-calling pipeline for one query.
    pub async fn search_books_with_tools(
        &self,
        query: &str,
    ) -> Result<ToolSearchOutcome, SearchError> {
        if !self.provider_enabled() {
            return Err(SearchError::ProviderUnavailable);
        }

        if self.denylist().contains(query) {
            debug!("query rejected by profanity filter");
            return Err(SearchError::ClientRejection);
        }

        let prompt = prompts::extraction_prompt(query);
        let outcome = self
            .llm()
            .complete_with_tools(
                &Completion {
                    system: None,
                    user: &prompt,
                    temperature: self.options().extract_temperature,
                    max_tokens: Some(self.options().extract_max_tokens),
                    tier: ModelTier::Extract,
                },
                &[prompts::search_tool_spec()],
            )
            .await
            .map_err(map_provider_error)?;

        match outcome {
            ToolOutcome::ToolCall { name, arguments } if name == prompts::SEARCH_TOOL_NAME => {
                self.run_tool_search(query, &arguments).await
            }
            ToolOutcome::ToolCall { name, .. } => {
                warn!(%name, "model requested a tool that does not exist");
                Err(SearchError::UpstreamUnavailable(format!(
                    "model requested unknown tool: {name}"
                )))
            }
            ToolOutcome::Text(text) => {
                // The model declined the capability despite `required`.
                info!("model answered without calling the search tool");
                Ok(ToolSearchOutcome::Raw(vec![text]))
            }
        }
    }

    async fn run_tool_search(
        &self,
        query: &str,
        arguments: &str,
    ) -> Result<ToolSearchOutcome, SearchError> {
        let args: SearchToolArgs = serde_json::from_str(arguments).map_err(|e| {
            SearchError::UpstreamUnavailable(format!("malformed tool arguments: {e}"))
        })?;
        let terms = args.search_terms;
        debug!(%terms, "model chose search terms");

        let key = normalize(&terms);
        if let Some(cached) = self.cache().get(&key).await {
            info!(%key, "cache hit — returning stored response");
            return Ok(ToolSearchOutcome::Structured(cached));
        }

        let records = self
            .bibliography()
            .search(&terms, self.options().result_limit)
            .await?;

        // Empty results become a sentinel payload rather than a 404: the
        // model gets to phrase the "nothing found" answer itself.
        let books_payload = if records.is_empty() {
            json!({"status": "No books found."}).to_string()
        } else {
            serde_json::to_string(&records).unwrap_or_else(|e| {
                warn!(error = %e, "failed to encode records for synthesis");
                json!({"status": "No books found."}).to_string()
            })
        };

        let system = prompts::synthesis_prompt(query, &books_payload);
        let raw = self
            .llm()
            .complete(&Completion {
                system: Some(&system),
                user: query,
                temperature: self.options().synth_temperature,
                max_tokens: Some(self.options().synth_max_tokens),
                tier: ModelTier::Synthesize,
            })
            .await
            .map_err(map_provider_error)?;

        // This path stores whatever it returns, degraded or not — the
        // model already phrased the empty-result case itself above.
        let parsed = parse_model_response(&raw).unwrap_or_else(degraded_response);
        self.store_in_background(key, parsed.clone());
        Ok(ToolSearchOutcome::Structured(parsed))
    }
}
