// Result Aggregator - folds the outcome stream into a RunSummary

use crate::domain::{RunSummary, TransferOutcome};
use crate::error::{AppError, Result};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::debug;

/// Counts outcomes by typed kind, never by message text
pub struct ResultAggregator {
    expected: usize,
    seen: HashSet<usize>,
    outcomes: Vec<TransferOutcome>,
    succeeded: usize,
    failed: usize,
}

impl ResultAggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            seen: HashSet::with_capacity(expected),
            outcomes: Vec::with_capacity(expected),
            succeeded: 0,
            failed: 0,
        }
    }

    /// Record one outcome; a second outcome for the same job is rejected
    pub fn record(&mut self, outcome: TransferOutcome) -> Result<()> {
        if !self.seen.insert(outcome.seq) {
            return Err(AppError::InvalidState(format!(
                "duplicate outcome for job {} ({})",
                outcome.seq, outcome.resource
            )));
        }

        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        debug!(
            resource = %outcome.resource,
            observed = self.outcomes.len() + 1,
            expected = self.expected,
            "Outcome aggregated"
        );
        self.outcomes.push(outcome);
        Ok(())
    }

    /// Drain a closed outcome channel
    pub async fn drain(&mut self, rx: &mut mpsc::Receiver<TransferOutcome>) -> Result<()> {
        while let Some(outcome) = rx.recv().await {
            self.record(outcome)?;
        }
        Ok(())
    }

    pub fn observed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_complete(&self) -> bool {
        self.observed() == self.expected
    }

    /// Produce the summary; fails unless exactly `expected` outcomes were seen
    pub fn finish(self, run_id: String, started_at: i64, finished_at: i64) -> Result<RunSummary> {
        if !self.is_complete() {
            return Err(AppError::InvalidState(format!(
                "expected {} outcomes, observed {}",
                self.expected,
                self.observed()
            )));
        }

        Ok(RunSummary {
            run_id,
            total: self.expected,
            succeeded: self.succeeded,
            failed: self.failed,
            started_at,
            finished_at,
            outcomes: self.outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{classify_response, FailureKind, TransferJob};

    fn outcome(seq: usize, status: u16) -> TransferOutcome {
        let job = TransferJob::new(seq, format!("repo-{}", seq), "alice", "bob").unwrap();
        classify_response(&job, status, "")
    }

    #[test]
    fn test_counts_by_kind_in_any_order() {
        let mut agg = ResultAggregator::new(4);
        for o in [outcome(3, 202), outcome(0, 404), outcome(2, 202), outcome(1, 500)] {
            agg.record(o).unwrap();
        }
        let summary = agg.finish("run-1".to_string(), 100, 250).unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.duration_ms(), 150);
        // Completion order is preserved
        let order: Vec<_> = summary.outcomes.iter().map(|o| o.seq).collect();
        assert_eq!(order, vec![3, 0, 2, 1]);
        let counts = summary.count_by_kind();
        assert_eq!(counts.get(&FailureKind::NotFound), Some(&1));
        assert_eq!(counts.get(&FailureKind::Unexpected), Some(&1));
    }

    #[test]
    fn test_duplicate_outcome_rejected() {
        let mut agg = ResultAggregator::new(2);
        agg.record(outcome(0, 202)).unwrap();
        let err = agg.record(outcome(0, 202)).unwrap_err();
        assert!(err.to_string().contains("duplicate outcome"));
    }

    #[test]
    fn test_missing_outcome_is_an_error() {
        let mut agg = ResultAggregator::new(3);
        agg.record(outcome(0, 202)).unwrap();
        agg.record(outcome(1, 202)).unwrap();
        assert!(!agg.is_complete());
        let err = agg.finish("run".to_string(), 0, 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_drain_closed_channel() {
        let (tx, mut rx) = mpsc::channel(3);
        for seq in 0..3 {
            tx.send(outcome(seq, 422)).await.unwrap();
        }
        drop(tx);

        let mut agg = ResultAggregator::new(3);
        agg.drain(&mut rx).await.unwrap();
        let summary = agg.finish("run".to_string(), 0, 1).unwrap();
        assert_eq!(summary.failed, 3);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failures().count(), 3);
    }
}
