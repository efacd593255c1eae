//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or an explicit `--config` path), then applies `BOOKSCOUT_LOG_LEVEL`,
//! `OPEN_LIBRARY_API`, `BADWORDSOURCE`, and `LLM_API_KEY` env overrides.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by the service.
//! - **raw** — Raw TOML deserialization types mirroring the file shape,
//!   with serde defaults; kept private.
//! - **load** — Loading logic: `load`, `load_from`, `Overrides`.

mod load;
mod raw;
mod types;

pub use load::{Overrides, load, load_from};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests — dummy LLM, no API keys, no external calls.
    pub fn test_default() -> Self {
        Self {
            service: ServiceConfig {
                name: "test".into(),
                bind: raw::default_bind(),
                log_level: "info".into(),
                log_file: None,
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                extract_temperature: 0.2,
                synth_temperature: 0.7,
                extract_max_tokens: 50,
                synth_max_tokens: 500,
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    extract_model: "test-extract".into(),
                    synth_model: "test-synth".into(),
                    timeout_seconds: 1,
                },
            },
            bibliography: BibliographyConfig {
                api_url: "http://localhost:0/search.json".into(),
                limit: 5,
                timeout_seconds: 1,
            },
            cache: CacheConfig {
                backend: "memory".into(),
                api_url: None,
            },
            profanity: ProfanityConfig { source_url: None },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[service]
name = "test-gateway"
log_level = "info"

[llm]
provider = "dummy"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.service.name, "test-gateway");
        assert_eq!(cfg.service.log_level, "info");
        assert_eq!(cfg.llm.provider, "dummy");
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let f = write_toml("[llm]\nprovider = \"dummy\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.bibliography.limit, 5);
        assert_eq!(cfg.bibliography.timeout_seconds, 5);
        assert_eq!(cfg.cache.backend, "memory");
        assert_eq!(cfg.llm.openai.synth_model, "gpt-4o-mini");
        assert!((cfg.llm.extract_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.llm.extract_max_tokens, 50);
        assert_eq!(cfg.llm.synth_max_tokens, 500);
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(
            std::path::Path::new("/nonexistent/config.toml"),
            &Overrides::default(),
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("config error"));
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let ov = Overrides {
            log_level: Some("debug".into()),
            ..Overrides::default()
        };
        let cfg = load_from(f.path(), &ov).unwrap();
        assert_eq!(cfg.service.log_level, "debug");
    }

    #[test]
    fn env_bibliography_and_denylist_overrides() {
        let f = write_toml(MINIMAL_TOML);
        let ov = Overrides {
            bibliography_url: Some("http://mock.test/search.json".into()),
            denylist_url: Some("http://mock.test/badwords.txt".into()),
            ..Overrides::default()
        };
        let cfg = load_from(f.path(), &ov).unwrap();
        assert_eq!(cfg.bibliography.api_url, "http://mock.test/search.json");
        assert_eq!(
            cfg.profanity.source_url.as_deref(),
            Some("http://mock.test/badwords.txt")
        );
    }

    #[test]
    fn openai_provider_requires_api_key() {
        let f = write_toml("[llm]\nprovider = \"openai\"\n");
        let result = load_from(f.path(), &Overrides::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn openai_provider_accepts_env_key() {
        let f = write_toml("[llm]\nprovider = \"openai\"\n");
        let ov = Overrides {
            llm_api_key: Some("sk-test".into()),
            ..Overrides::default()
        };
        let cfg = load_from(f.path(), &ov).unwrap();
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn http_cache_requires_url() {
        let f = write_toml("[llm]\nprovider = \"dummy\"\n\n[cache]\nbackend = \"http\"\n");
        let result = load_from(f.path(), &Overrides::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api_url"));
    }

    #[test]
    fn missing_denylist_url_is_not_an_error() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert!(cfg.profanity.source_url.is_none());
    }
}
