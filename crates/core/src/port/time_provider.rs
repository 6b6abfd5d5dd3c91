// Clock Port
// Stamps run start/finish and per-outcome completion times

use std::sync::atomic::{AtomicI64, Ordering};

pub trait TimeProvider: Send + Sync {
    /// Epoch milliseconds
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by chrono
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Monotonic fake clock: every read advances by `step` ms
pub struct SteppingTimeProvider {
    now: AtomicI64,
    step: i64,
}

impl SteppingTimeProvider {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            step,
        }
    }
}

impl TimeProvider for SteppingTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}
