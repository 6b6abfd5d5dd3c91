// Remote API configuration

use repo_transfer_core::domain::pool::{validate_request_timeout, DEFAULT_REQUEST_TIMEOUT};
use repo_transfer_core::domain::{PoolConfig, RetryConfig};
use repo_transfer_core::error::{AppError, Result};
use std::time::Duration;

/// Public GitHub REST API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// REST API version sent in `X-GitHub-Api-Version`
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// HTTP client configuration for the transfer endpoint
///
/// `request_timeout` and `retry` mirror the pool settings of the same run;
/// build it with `from_pool` so both sides agree. `HttpTransferExecutor::new`
/// applies the same checks as `PoolConfig::validate`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.github.com` or a GHES `https://host/api/v3`
    pub base_url: String,
    pub api_version: String,
    /// GitHub rejects requests without a User-Agent
    pub user_agent: String,
    /// Per-attempt timeout
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: format!("repo-transfer/{}", repo_transfer_core::VERSION),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        self.retry
            .validate()
            .and_then(|()| validate_request_timeout(self.request_timeout))
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Take timeout and retry settings from the pool configuration
    pub fn from_pool(pool: &PoolConfig) -> Self {
        Self {
            request_timeout: pool.request_timeout,
            retry: pool.retry.clone(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
