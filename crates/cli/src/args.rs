// Command-line and environment settings

use anyhow::{Context, Result};
use clap::Parser;
use repo_transfer_core::domain::pool::{
    DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_WORKER_COUNT,
};
use repo_transfer_core::domain::{PoolConfig, RetryConfig};
use repo_transfer_infra_http::config::{DEFAULT_API_BASE_URL, DEFAULT_API_VERSION};
use repo_transfer_infra_http::ApiConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Dotenv file read from the working directory before flags are parsed
pub const ENV_FILE: &str = ".env";

/// Load `KEY=value` pairs into the process environment.
///
/// Variables already set win over the file. Returns `false` when the file
/// does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

#[derive(Parser, Debug)]
#[command(name = "repo-transfer")]
#[command(about = "Transfer ownership of many GitHub repositories concurrently", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Input file with originalAccount, newAccount and resources
    #[arg(short, long, env = "REPO_TRANSFER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Personal access token
    #[arg(long, env = "GITHUB_TOKEN_CLASSIC", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Number of concurrent workers
    #[arg(short, long, env = "REPO_TRANSFER_WORKERS", default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Transport retries after the first attempt
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Wait before the first retry (ms)
    #[arg(long, default_value_t = DEFAULT_INITIAL_BACKOFF.as_millis() as u64)]
    pub retry_wait_ms: u64,

    /// Upper bound for a single retry wait (ms)
    #[arg(long, default_value_t = DEFAULT_MAX_BACKOFF.as_millis() as u64)]
    pub retry_max_wait_ms: u64,

    /// Per-attempt HTTP timeout (seconds)
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Cancel whatever is still running after this many seconds
    #[arg(long)]
    pub run_timeout_secs: Option<u64>,

    /// API base URL (GitHub Enterprise: https://host/api/v3)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// Value of the X-GitHub-Api-Version header
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Exit with status 2 when any transfer failed
    #[arg(long, env = "REPO_TRANSFER_FAIL_ON_ERROR")]
    pub fail_on_error: bool,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub summary_json: bool,
}

impl Cli {
    /// Input path with `~` expanded
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.config).into_owned())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            worker_count: self.workers,
            retry: RetryConfig {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.retry_wait_ms),
                max_backoff: Duration::from_millis(self.retry_max_wait_ms),
            },
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            run_deadline: self.run_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn api_config(&self, pool: &PoolConfig) -> ApiConfig {
        ApiConfig::from_pool(pool)
            .with_base_url(self.api_url.as_str())
            .with_api_version(self.api_version.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["repo-transfer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_flags() {
        let cli = parse(&[
            "--config",
            "transfers.json",
            "--token",
            "abc",
            "--workers",
            "20",
            "--max-retries",
            "1",
            "--retry-wait-ms",
            "100",
            "--retry-max-wait-ms",
            "400",
            "--request-timeout-secs",
            "5",
            "--run-timeout-secs",
            "60",
            "--fail-on-error",
        ]);
        assert_eq!(cli.token, "abc");
        assert!(cli.fail_on_error);

        let pool = cli.pool_config();
        assert_eq!(pool.worker_count, 20);
        assert_eq!(pool.retry.max_retries, 1);
        assert_eq!(pool.retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(pool.retry.max_backoff, Duration::from_millis(400));
        assert_eq!(pool.request_timeout, Duration::from_secs(5));
        assert_eq!(pool.run_deadline, Some(Duration::from_secs(60)));
        assert!(pool.validate().is_ok());
    }

    #[test]
    fn test_api_config_follows_pool() {
        let cli = parse(&[
            "--token",
            "abc",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "--request-timeout-secs",
            "7",
        ]);
        let pool = cli.pool_config();
        let api = cli.api_config(&pool);
        assert_eq!(api.base_url, "https://ghe.example.com/api/v3");
        assert_eq!(api.api_version, DEFAULT_API_VERSION);
        assert_eq!(api.request_timeout, Duration::from_secs(7));
        assert_eq!(api.retry, pool.retry);
    }

    fn env_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.env", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_env_file_sets_missing_variables() {
        let path = env_file(
            "repo-transfer-env",
            "REPO_TRANSFER_TEST_ENV_TOKEN=from-file\nREPO_TRANSFER_TEST_ENV_KEPT=from-file\n",
        );
        std::env::set_var("REPO_TRANSFER_TEST_ENV_KEPT", "from-process");

        assert!(load_env_file(&path).unwrap());
        assert_eq!(
            std::env::var("REPO_TRANSFER_TEST_ENV_TOKEN").unwrap(),
            "from-file"
        );
        assert_eq!(
            std::env::var("REPO_TRANSFER_TEST_ENV_KEPT").unwrap(),
            "from-process"
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let path = std::env::temp_dir().join("repo-transfer-no-such-file.env");
        assert!(!load_env_file(&path).unwrap());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let path = env_file("repo-transfer-bad-env", "NOT VALID LINE\n");
        let err = load_env_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_tilde_expanded_in_config_path() {
        let cli = parse(&["--token", "abc", "--config", "~/transfers.json"]);
        assert!(!cli.config_path().to_string_lossy().starts_with('~'));
        assert!(cli.config_path().ends_with("transfers.json"));
    }
}
