//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub service: RawService,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub bibliography: RawBibliography,
    #[serde(default)]
    pub cache: RawCache,
    #[serde(default)]
    pub profanity: RawProfanity,
}

#[derive(Deserialize)]
pub(super) struct RawService {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            bind: default_bind(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_extract_temperature")]
    pub extract_temperature: f32,
    #[serde(default = "default_synth_temperature")]
    pub synth_temperature: f32,
    #[serde(default = "default_extract_max_tokens")]
    pub extract_max_tokens: u32,
    #[serde(default = "default_synth_max_tokens")]
    pub synth_max_tokens: u32,
    #[serde(default)]
    pub openai: RawOpenAi,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            extract_temperature: default_extract_temperature(),
            synth_temperature: default_synth_temperature(),
            extract_max_tokens: default_extract_max_tokens(),
            synth_max_tokens: default_synth_max_tokens(),
            openai: RawOpenAi::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAi {
    #[serde(default = "default_openai_url")]
    pub api_base_url: String,
    #[serde(default = "default_extract_model")]
    pub extract_model: String,
    #[serde(default = "default_synth_model")]
    pub synth_model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_url(),
            extract_model: default_extract_model(),
            synth_model: default_synth_model(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawBibliography {
    #[serde(default = "default_bibliography_url")]
    pub api_url: String,
    #[serde(default = "default_bibliography_limit")]
    pub limit: u32,
    #[serde(default = "default_bibliography_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RawBibliography {
    fn default() -> Self {
        Self {
            api_url: default_bibliography_url(),
            limit: default_bibliography_limit(),
            timeout_seconds: default_bibliography_timeout(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawCache {
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Default for RawCache {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            api_url: None,
        }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawProfanity {
    #[serde(default)]
    pub source_url: Option<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_service_name() -> String {
    "bookscout".to_string()
}

pub(super) fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_extract_temperature() -> f32 {
    0.2
}

fn default_synth_temperature() -> f32 {
    0.7
}

// Extraction replies are a handful of keywords; synthesis is a full
// structured response.
fn default_extract_max_tokens() -> u32 {
    50
}

fn default_synth_max_tokens() -> u32 {
    500
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_extract_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_synth_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_bibliography_url() -> String {
    "https://openlibrary.org/search.json".to_string()
}

fn default_bibliography_limit() -> u32 {
    5
}

// The external search call is hard-bounded at five seconds.
fn default_bibliography_timeout() -> u64 {
    5
}

fn default_cache_backend() -> String {
    "memory".to_string()
}
