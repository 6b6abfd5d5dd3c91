// Outcome Reporter Port
// Logging capability injected into the coordinator instead of global state

use crate::domain::{RunSummary, TransferOutcome};
use tracing::{error, info, warn};

/// Sink for per-job and per-run events
pub trait OutcomeReporter: Send + Sync {
    /// Called once per job, by the worker that produced the outcome
    fn job_completed(&self, outcome: &TransferOutcome);

    /// Called once per run, after every outcome has been aggregated
    fn run_completed(&self, summary: &RunSummary);
}

/// Production reporter: structured `tracing` events
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn job_completed(&self, outcome: &TransferOutcome) {
        let worker_id = outcome.worker_id.unwrap_or_default();
        let status = outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());

        match outcome.failure_kind() {
            None => info!(
                resource = %outcome.resource,
                worker_id,
                status = %status,
                attempts = outcome.attempts,
                "Repository transfer successful"
            ),
            Some(kind) => error!(
                resource = %outcome.resource,
                worker_id,
                status = %status,
                kind = %kind,
                attempts = outcome.attempts,
                detail = outcome.detail().unwrap_or_default(),
                "Repository transfer failed"
            ),
        }
    }

    fn run_completed(&self, summary: &RunSummary) {
        if summary.all_succeeded() {
            info!(
                run_id = %summary.run_id,
                total = summary.total,
                succeeded = summary.succeeded,
                failed = summary.failed,
                duration_ms = summary.duration_ms(),
                "Transfer run finished"
            );
        } else {
            warn!(
                run_id = %summary.run_id,
                total = summary.total,
                succeeded = summary.succeeded,
                failed = summary.failed,
                duration_ms = summary.duration_ms(),
                "Transfer run finished with failures"
            );
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Reporter that keeps every event for assertions
    #[derive(Default)]
    pub struct RecordingReporter {
        outcomes: Mutex<Vec<TransferOutcome>>,
        summaries: Mutex<Vec<RunSummary>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn outcomes(&self) -> Vec<TransferOutcome> {
            self.outcomes.lock().unwrap().clone()
        }

        pub fn summaries(&self) -> Vec<RunSummary> {
            self.summaries.lock().unwrap().clone()
        }
    }

    impl OutcomeReporter for RecordingReporter {
        fn job_completed(&self, outcome: &TransferOutcome) {
            self.outcomes.lock().unwrap().push(outcome.clone());
        }

        fn run_completed(&self, summary: &RunSummary) {
            self.summaries.lock().unwrap().push(summary.clone());
        }
    }
}
