//! Bookscout — book-recommendation gateway entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build provider, denylist, bibliography client, cache
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Serve until cancelled

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use bookscout::bibliography::BibliographyClient;
use bookscout::cache::ResponseCache;
use bookscout::config;
use bookscout::error::AppError;
use bookscout::llm::providers;
use bookscout::logger;
use bookscout::pipeline::{PipelineOptions, SearchService};
use bookscout::profanity::Denylist;
use bookscout::server::{self, GatewayState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

struct CliArgs {
    config_path: Option<String>,
    log_level: Option<&'static str>,
}

fn parse_cli_args() -> CliArgs {
    let mut args = CliArgs {
        config_path: None,
        log_level: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => args.config_path = iter.next(),
            "-v" => args.log_level = Some("debug"),
            "-vv" => args.log_level = Some("trace"),
            _ => eprintln!("warning: ignoring unknown argument '{arg}'"),
        }
    }
    args
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.service.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(
        effective_log_level,
        force_cli_level,
        config.service.log_file.as_deref(),
    )?;

    info!(
        service = %config.service.name,
        bind = %config.service.bind,
        llm_provider = %config.llm.provider,
        cache_backend = %config.cache.backend,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    // Provider construction failure (or a missing credential, caught during
    // config load) is fatal — the service never serves without it.
    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;

    // Best-effort: failure degrades to an empty denylist inside load().
    let denylist = Denylist::load(config.profanity.source_url.as_deref()).await;

    let bibliography = BibliographyClient::open_library(&config.bibliography)?;
    let cache = Arc::new(ResponseCache::from_config(&config.cache)?);

    let service = Arc::new(SearchService::new(
        provider,
        bibliography,
        cache,
        denylist,
        PipelineOptions::from_config(&config),
    ));

    // Shared shutdown token — Ctrl-C cancels it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let state = GatewayState {
        service,
        service_name: Arc::from(config.service.name.as_str()),
    };

    server::serve(&config.service.bind, state, shutdown).await
}
