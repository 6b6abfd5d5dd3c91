// Transfer Executor Port
// Abstraction for delivering one ownership-transfer request to the remote API

use crate::domain::{Credential, TransferJob, TransferOutcome};
use async_trait::async_trait;

/// Transfer Executor trait
///
/// Implementations:
/// - HttpTransferExecutor (infra-http): POSTs to the GitHub transfer endpoint
/// - MockTransferExecutor: scripted outcomes for tests
///
/// `execute` is infallible by contract. Every failure, including transport
/// errors after retries are exhausted, is returned as a Failure outcome for
/// the given job. Retries must be internal: one call, one outcome.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn execute(&self, job: &TransferJob, credential: &Credential) -> TransferOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::classify_response;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Respond as if the API returned this status code
        Status(u16),
        /// Fail as if every transport attempt failed
        TransportError { attempts: u32 },
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Never complete (for cancellation testing)
        Hang,
    }

    /// Decrements the in-flight gauge even when the call is aborted
    struct InFlightGuard(Arc<AtomicUsize>);

    impl Drop for InFlightGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Mock Transfer Executor for testing
    pub struct MockTransferExecutor {
        default: MockBehavior,
        overrides: HashMap<String, MockBehavior>,
        delay: Duration,
        call_count: AtomicUsize,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransferExecutor {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                overrides: HashMap::new(),
                delay: Duration::ZERO,
                call_count: AtomicUsize::new(0),
                in_flight: Arc::new(AtomicUsize::new(0)),
                max_in_flight: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Status(202))
        }

        /// Override the behavior for one resource name
        pub fn with_resource(mut self, resource: impl Into<String>, behavior: MockBehavior) -> Self {
            self.overrides.insert(resource.into(), behavior);
            self
        }

        /// Simulated latency per call
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        /// Resource names in the order calls started
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransferExecutor for MockTransferExecutor {
        async fn execute(&self, job: &TransferJob, _credential: &Credential) -> TransferOutcome {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(job.resource.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _guard = InFlightGuard(Arc::clone(&self.in_flight));
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let behavior = self
                .overrides
                .get(&job.resource)
                .unwrap_or(&self.default)
                .clone();

            match behavior {
                MockBehavior::Status(status) => {
                    classify_response(job, status, r#"{"message": "mock"}"#)
                }
                MockBehavior::TransportError { attempts } => {
                    TransferOutcome::transport_error(job, attempts, "mock connection refused")
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!("pending future never resolves")
                }
            }
        }
    }
}
