//! Configuration loading with env-var overrides.
//!
//! Reads a TOML file (explicit path, or `config/default.toml` when present,
//! or built-in defaults), then applies environment overrides. The LLM API
//! key comes exclusively from the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Environment values that override file settings. Collected once in
/// [`load`] so tests can call [`load_from`] hermetically.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `BOOKSCOUT_LOG_LEVEL`
    pub log_level: Option<String>,
    /// `OPEN_LIBRARY_API`
    pub bibliography_url: Option<String>,
    /// `BADWORDSOURCE`
    pub denylist_url: Option<String>,
    /// `LLM_API_KEY`
    pub llm_api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("BOOKSCOUT_LOG_LEVEL").ok(),
            bibliography_url: env::var("OPEN_LIBRARY_API").ok(),
            denylist_url: env::var("BADWORDSOURCE").ok(),
            llm_api_key: env::var("LLM_API_KEY").ok(),
        }
    }
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. If neither file exists, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        resolve(RawConfig::default(), &overrides)
    }
}

/// Load and resolve a specific config file with explicit overrides.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let raw_text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let raw: RawConfig = toml::from_str(&raw_text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(raw, overrides)
}

/// Convert the raw TOML shape into the public config, applying overrides
/// and validating startup invariants.
fn resolve(raw: RawConfig, overrides: &Overrides) -> Result<Config, AppError> {
    let llm_api_key = overrides.llm_api_key.clone();

    // The OpenAI-backed provider cannot run without a credential. Fail
    // loudly at startup instead of failing every request later.
    if matches!(raw.llm.provider.as_str(), "openai" | "openai-compatible") && llm_api_key.is_none()
    {
        return Err(AppError::Config(format!(
            "LLM_API_KEY must be set when [llm] provider = \"{}\"",
            raw.llm.provider
        )));
    }

    let config = Config {
        service: ServiceConfig {
            name: raw.service.name,
            bind: raw.service.bind,
            log_level: overrides
                .log_level
                .clone()
                .unwrap_or(raw.service.log_level),
            log_file: raw.service.log_file.map(PathBuf::from),
        },
        llm: LlmConfig {
            provider: raw.llm.provider,
            extract_temperature: raw.llm.extract_temperature,
            synth_temperature: raw.llm.synth_temperature,
            extract_max_tokens: raw.llm.extract_max_tokens,
            synth_max_tokens: raw.llm.synth_max_tokens,
            openai: OpenAiConfig {
                api_base_url: raw.llm.openai.api_base_url,
                extract_model: raw.llm.openai.extract_model,
                synth_model: raw.llm.openai.synth_model,
                timeout_seconds: raw.llm.openai.timeout_seconds,
            },
        },
        bibliography: BibliographyConfig {
            api_url: overrides
                .bibliography_url
                .clone()
                .unwrap_or(raw.bibliography.api_url),
            limit: raw.bibliography.limit,
            timeout_seconds: raw.bibliography.timeout_seconds,
        },
        cache: CacheConfig {
            backend: raw.cache.backend,
            api_url: raw.cache.api_url,
        },
        profanity: ProfanityConfig {
            source_url: overrides
                .denylist_url
                .clone()
                .or(raw.profanity.source_url),
        },
        llm_api_key,
    };

    if config.cache.backend == "http" && config.cache.api_url.is_none() {
        return Err(AppError::Config(
            "[cache] api_url is required when backend = \"http\"".into(),
        ));
    }

    Ok(config)
}
