// Worker Pool Configuration

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of concurrent workers
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default transport retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait before the first retry
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(2);

/// Default upper bound for a single backoff wait
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Default per-attempt HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport retry settings (read-only for the run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryConfig {
    /// Total attempts a request may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_backoff > self.max_backoff {
            return Err(DomainError::ValidationError(format!(
                "initial backoff {:?} exceeds max backoff {:?}",
                self.initial_backoff, self.max_backoff
            )));
        }
        Ok(())
    }
}

/// Pool configuration passed into the coordinator at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub worker_count: usize,
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    /// Whole-run deadline; `None` means the run waits for every job
    pub run_deadline: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            retry: RetryConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            run_deadline: None,
        }
    }
}

impl PoolConfig {
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(DomainError::InvalidWorkerCount(self.worker_count));
        }
        self.retry.validate()?;
        validate_request_timeout(self.request_timeout)
    }
}

/// Shared by the pool and the HTTP client configuration
pub fn validate_request_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(DomainError::ValidationError(
            "request timeout must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_client() {
        let config = PoolConfig::default();
        assert_eq!(config.worker_count, 5);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.max_attempts(), 4);
        assert_eq!(config.retry.initial_backoff, Duration::from_secs(2));
        assert_eq!(config.retry.max_backoff, Duration::from_secs(10));
        assert!(config.run_deadline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = PoolConfig::default().with_workers(0);
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_inverted_backoff_rejected() {
        let config = PoolConfig::default().with_retry(RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_secs(20),
            max_backoff: Duration::from_secs(1),
        });
        assert!(config.validate().is_err());
    }
}
