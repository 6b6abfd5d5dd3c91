// Run Summary Domain Model

use crate::domain::{FailureKind, TransferOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate result of a run
///
/// `succeeded + failed == total`, and `outcomes` holds exactly one entry per
/// seeded job in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: i64,  // epoch ms
    pub finished_at: i64, // epoch ms
    pub outcomes: Vec<TransferOutcome>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).max(0)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn count_by_kind(&self) -> HashMap<FailureKind, usize> {
        let mut counts = HashMap::new();
        for kind in self.outcomes.iter().filter_map(|o| o.failure_kind()) {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn cancelled(&self) -> usize {
        self.count_by_kind()
            .get(&FailureKind::Cancelled)
            .copied()
            .unwrap_or(0)
    }
}
