//! repo-transfer - bulk repository ownership transfer
//!
//! Reads `originalAccount`, `newAccount` and `resources` from a JSON file and
//! transfers every listed repository with a fixed pool of workers.

mod args;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use repo_transfer_core::application::{shutdown_channel, RunCoordinator, TransferRequest};
use repo_transfer_core::domain::Credential;
use repo_transfer_core::port::id_provider::UuidProvider;
use repo_transfer_core::port::time_provider::SystemTimeProvider;
use repo_transfer_core::port::TracingReporter;
use repo_transfer_infra_http::HttpTransferExecutor;

use args::Cli;
use logging::LogFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env before clap so GITHUB_TOKEN_CLASSIC and friends can come from it
    let env_file = args::load_env_file(Path::new(args::ENV_FILE));
    let cli = Cli::parse();

    // 1. Logging
    let log_dir = std::env::var("REPO_TRANSFER_LOG_DIR")
        .ok()
        .map(|d| PathBuf::from(shellexpand::tilde(&d).into_owned()));
    let _log_guard = logging::init(LogFormat::from_env(), log_dir.as_deref())?;

    info!("Repository transfer v{} starting", VERSION);
    match env_file.context("Failed to read environment file")? {
        true => info!(path = args::ENV_FILE, "Loaded environment file"),
        false => debug!(path = args::ENV_FILE, "No environment file found"),
    }

    // 2. Credential before anything else touches the input
    if let Err(e) = Credential::new(cli.token.as_str()) {
        error!(error = %e, "GITHUB_TOKEN_CLASSIC is not set");
        anyhow::bail!("GITHUB_TOKEN_CLASSIC environment variable is not set (or pass --token)");
    }
    info!("GITHUB_TOKEN_CLASSIC loaded successfully");

    // 3. Input file
    let config_path = cli.config_path();
    let raw = tokio::fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let request = TransferRequest::from_json(&raw)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        original_account = %request.original_account,
        new_account = %request.new_account,
        resources = request.resources.len(),
        "Configuration loaded"
    );

    // 4. DI wiring
    let pool_config = cli.pool_config();
    let executor = Arc::new(
        HttpTransferExecutor::new(cli.api_config(&pool_config))
            .context("Failed to initialize HTTP client")?,
    );
    let mut coordinator = RunCoordinator::new(
        pool_config,
        executor,
        Arc::new(TracingReporter),
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    );

    // 5. Ctrl-C cancels remaining transfers
    let (shutdown_tx, shutdown) = shutdown_channel();
    let signal_handler = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl-C, stopping");
                shutdown_tx.shutdown();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    // 6. Run
    let result = coordinator
        .run_with_shutdown(request, cli.token.as_str(), shutdown)
        .await;
    signal_handler.abort();
    let summary = result.context("Transfer run aborted")?;

    report::print_summary(&summary, cli.summary_json)?;
    Ok(ExitCode::from(report::exit_status(&summary, cli.fail_on_error)))
}
