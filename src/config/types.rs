//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the service consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

/// Top-level service settings.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Display name used in logs and the health endpoint.
    pub name: String,
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    /// Log level string consumed by the logger.
    pub log_level: String,
    /// Optional log file; stderr when absent.
    pub log_file: Option<PathBuf>,
}

/// OpenAI-compatible endpoint settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base_url: String,
    /// Model used for the keyword-extraction call.
    pub extract_model: String,
    /// Model used for the synthesis call.
    pub synth_model: String,
    pub timeout_seconds: u64,
}

/// LLM settings shared by both pipelines.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Backend selector: `"openai"`, `"dummy"`, or `"disabled"`.
    pub provider: String,
    /// Near-deterministic sampling for keyword extraction.
    pub extract_temperature: f32,
    /// Moderate sampling for response synthesis.
    pub synth_temperature: f32,
    /// Token cap for the extraction reply.
    pub extract_max_tokens: u32,
    /// Token cap for the synthesis reply.
    pub synth_max_tokens: u32,
    pub openai: OpenAiConfig,
}

/// Bibliography search API settings.
#[derive(Debug, Clone)]
pub struct BibliographyConfig {
    /// Search endpoint, e.g. `https://openlibrary.org/search.json`.
    pub api_url: String,
    /// Maximum records requested per search.
    pub limit: u32,
    /// Request timeout bounding each search call.
    pub timeout_seconds: u64,
}

/// Response cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// `"memory"` or `"http"`.
    pub backend: String,
    /// Document-store base URL; required for the `"http"` backend.
    pub api_url: Option<String>,
}

/// Profanity denylist settings.
#[derive(Debug, Clone)]
pub struct ProfanityConfig {
    /// Newline-separated word list URL. Absent → empty denylist.
    pub source_url: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub llm: LlmConfig,
    pub bibliography: BibliographyConfig,
    pub cache: CacheConfig,
    pub profanity: ProfanityConfig,
    /// Sourced from `LLM_API_KEY` env — never TOML.
    pub llm_api_key: Option<String>,
}
