// Transport retry policy
use crate::application::worker::constants::{BACKOFF_JITTER_RATIO, BACKOFF_MULTIPLIER};
use crate::domain::RetryConfig;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after this delay
    Retry(Duration),
    /// Do not retry, the request has failed permanently
    Failed,
}

/// Retry policy for transport-level failures
///
/// Only failures that never produced an HTTP response are retried. A response
/// with any status code is terminal and is classified, not retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts()
    }

    /// Decide what to do after `attempts_made` failed attempts
    ///
    /// Backoff formula:
    /// delay = min(max_backoff, initial_backoff * 2^(attempts_made - 1)) * (1.0 ± 0.1)
    /// and never more than `max_backoff`.
    ///
    /// # Example
    /// ```text
    /// match policy.should_retry(1) {
    ///     RetryDecision::Retry(delay) => sleep(delay).await,
    ///     RetryDecision::Failed => return outcome,
    /// }
    /// ```
    pub fn should_retry(&self, attempts_made: u32) -> RetryDecision {
        if attempts_made >= self.config.max_attempts() {
            warn!(
                attempts = attempts_made,
                max_attempts = self.config.max_attempts(),
                "Max retry attempts reached"
            );
            return RetryDecision::Failed;
        }

        // ±10% jitter keeps a pool of workers from retrying in lockstep
        let base = self.base_delay(attempts_made);
        let jitter = rand::thread_rng().gen_range(1.0 - BACKOFF_JITTER_RATIO..=1.0 + BACKOFF_JITTER_RATIO);
        let delay = base.mul_f64(jitter).min(self.config.max_backoff);

        info!(
            attempt = attempts_made,
            max_attempts = self.config.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling retry"
        );

        RetryDecision::Retry(delay)
    }

    /// Backoff before jitter for the retry following `attempts_made` attempts
    pub fn base_delay(&self, attempts_made: u32) -> Duration {
        let exponent = attempts_made.saturating_sub(1).min(16);
        self.config
            .initial_backoff
            .saturating_mul(BACKOFF_MULTIPLIER.saturating_pow(exponent))
            .min(self.config.max_backoff)
    }
}
