//! Logging setup for the gateway binary.
//!
//! [`init`] installs the global subscriber once at startup, after `main`
//! has resolved the effective level from its `-v`/`-vv` flags, the
//! `BOOKSCOUT_LOG_LEVEL` override, and the config file. Output goes to
//! stderr, or to the configured log file.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Install the global tracing subscriber.
///
/// `level` is the resolved level string (`"error"` … `"trace"`). When
/// `level_from_cli` is set, a `-v`/`-vv` flag chose it and it wins
/// outright; otherwise a `RUST_LOG` directive takes precedence and `level`
/// is the fallback. Unrecognised level strings are rejected rather than
/// silently downgraded.
pub fn init(level: &str, level_from_cli: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = resolve_filter(level, level_from_cli)?;

    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Logger(format!("cannot open log file '{}': {e}", path.display()))
                })?;
            BoxMakeWriter::new(file)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Build the filter for the precedence chain described on [`init`].
///
/// `EnvFilter` accepts bare words as target directives, so the level string
/// is validated as a [`LevelFilter`] first — a typo in the config must fail
/// startup, not filter everything out.
fn resolve_filter(level: &str, level_from_cli: bool) -> Result<EnvFilter, AppError> {
    if !level_from_cli {
        if let Ok(env) = EnvFilter::try_from_default_env() {
            return Ok(env);
        }
    }

    let parsed = level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))?;
    Ok(EnvFilter::default().add_directive(parsed.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_levels_resolve() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(
                resolve_filter(l, true).is_ok(),
                "expected '{l}' to be valid"
            );
        }
    }

    #[test]
    fn bogus_level_is_rejected_not_downgraded() {
        // "verbose" would pass EnvFilter as a target directive; it must
        // still be rejected as a level.
        assert!(resolve_filter("verbose", true).is_err());
        assert!(resolve_filter("", true).is_err());
    }

    #[test]
    fn cli_level_sets_the_filter_directly() {
        let filter = resolve_filter("debug", true).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn init_succeeds_or_reports_existing_subscriber() {
        // May already be set by a prior test in the same process — both outcomes are fine.
        match init("info", false, None) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
