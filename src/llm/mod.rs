//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency:
//! adding a backend = new module + new variant + new match arms.
//!
//! Two call shapes exist, mirroring the pipeline's needs:
//! [`complete`](LlmProvider::complete) for plain prompt → text, and
//! [`complete_with_tools`](LlmProvider::complete_with_tools) for the
//! function-calling protocol where the model may elect to invoke a
//! described capability and supply its arguments.

pub mod providers;

use serde_json::Value;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("no llm provider configured")]
    Disabled,
}

// ── Request / response shapes ─────────────────────────────────────────────────

/// Which configured model a completion targets.
///
/// Extraction runs on the cheaper model with near-deterministic sampling;
/// synthesis runs on the stronger model with moderate sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Extract,
    Synthesize,
}

/// One chat round-trip. History management is the caller's responsibility —
/// every request is self-contained.
#[derive(Debug, Clone)]
pub struct Completion<'a> {
    pub system: Option<&'a str>,
    pub user: &'a str,
    pub temperature: f32,
    /// Reply-length cap forwarded to the backend; `None` leaves it unset.
    pub max_tokens: Option<u32>,
    pub tier: ModelTier,
}

/// A callable capability described to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON-schema object describing the tool parameters.
    pub parameters: Value,
}

/// Result of a tool-enabled completion: the model either invoked a tool
/// (name + raw JSON arguments) or answered with plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    ToolCall { name: String, arguments: String },
    Text(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    /// Sentinel for a deliberately unconfigured provider. Every call fails
    /// with [`ProviderError::Disabled`]; the tools entry point reports 503.
    Disabled,
}

impl LlmProvider {
    /// Human-readable backend name for logs and the health endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAiCompatible(_) => "openai-compatible",
            LlmProvider::Disabled => "disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, LlmProvider::Disabled)
    }

    /// Send a plain completion and return the model's text reply.
    pub async fn complete(&self, request: &Completion<'_>) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(request).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(request).await,
            LlmProvider::Disabled => Err(ProviderError::Disabled),
        }
    }

    /// Send a tool-enabled completion. Tool use is forced (`required`):
    /// the backend asks the model to pick some capability, though a model
    /// may still answer with plain text.
    pub async fn complete_with_tools(
        &self,
        request: &Completion<'_>,
        tools: &[ToolSpec],
    ) -> Result<ToolOutcome, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete_with_tools(request, tools).await,
            LlmProvider::OpenAiCompatible(p) => p.complete_with_tools(request, tools).await,
            LlmProvider::Disabled => Err(ProviderError::Disabled),
        }
    }
}
