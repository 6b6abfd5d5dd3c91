// Worker - Transfer execution loop

pub mod constants;
mod panic_guard;
mod shutdown;

pub use panic_guard::{describe_join_error, panic_message};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::dispatcher::JobQueue;
use crate::domain::{Credential, FailureKind, TransferJob, TransferOutcome};
use crate::port::{OutcomeReporter, TimeProvider, TransferExecutor};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Shared, read-only dependencies handed to every worker of a pool
#[derive(Clone)]
pub struct WorkerContext {
    pub executor: Arc<dyn TransferExecutor>,
    pub credential: Arc<Credential>,
    pub reporter: Arc<dyn OutcomeReporter>,
    pub time_provider: Arc<dyn TimeProvider>,
}

/// Worker pulls jobs from the shared queue until it is drained
///
/// Each dequeued job yields exactly one outcome on the outcome channel,
/// whether the transfer succeeds, fails, panics, or is cancelled.
pub struct TransferWorker {
    id: usize,
    queue: JobQueue,
    ctx: WorkerContext,
    outcomes: mpsc::Sender<TransferOutcome>,
}

impl TransferWorker {
    pub fn new(
        id: usize,
        queue: JobQueue,
        ctx: WorkerContext,
        outcomes: mpsc::Sender<TransferOutcome>,
    ) -> Self {
        Self {
            id,
            queue,
            ctx,
            outcomes,
        }
    }

    /// Run worker loop; returns the number of jobs this worker reported
    pub async fn run(self, mut shutdown: ShutdownToken) -> usize {
        info!(worker_id = self.id, "Worker started");
        let mut processed = 0;

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let job = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                job = self.queue.next() => job,
            };

            let Some(job) = job else {
                break;
            };

            let outcome = self.process(job, &mut shutdown).await;
            self.publish(outcome).await;
            processed += 1;
        }

        // Claim whatever is still queued so every job gets a terminal outcome
        if shutdown.is_shutdown() {
            let mut cancelled = 0;
            while let Some(job) = self.queue.next().await {
                self.publish(TransferOutcome::cancelled(&job)).await;
                cancelled += 1;
            }
            if cancelled > 0 {
                warn!(
                    worker_id = self.id,
                    cancelled, "Worker drained queued jobs after shutdown"
                );
            }
            processed += cancelled;
        }

        info!(worker_id = self.id, processed, "Worker finished");
        processed
    }

    /// Execute one job in its own task (panic isolation) and race it against shutdown
    async fn process(&self, job: TransferJob, shutdown: &mut ShutdownToken) -> TransferOutcome {
        info!(
            worker_id = self.id,
            resource = %job.resource,
            seq = job.seq,
            "Processing repository transfer"
        );

        // Claimed just as the run was cancelled: never send the request
        if shutdown.is_shutdown() {
            warn!(
                worker_id = self.id,
                resource = %job.resource,
                "Shutdown already requested, skipping transfer"
            );
            return TransferOutcome::cancelled(&job);
        }

        let executor = Arc::clone(&self.ctx.executor);
        let credential = Arc::clone(&self.ctx.credential);
        let job_for_exec = job.clone();

        let mut handle =
            tokio::spawn(async move { executor.execute(&job_for_exec, &credential).await });

        let result = tokio::select! {
            res = &mut handle => res,
            _ = shutdown.wait() => {
                handle.abort();
                warn!(
                    worker_id = self.id,
                    resource = %job.resource,
                    "Transfer abandoned due to shutdown"
                );
                return TransferOutcome::cancelled(&job);
            }
        };

        match result {
            Ok(outcome) if outcome.seq == job.seq && outcome.resource == job.resource => outcome,
            Ok(outcome) => {
                error!(
                    worker_id = self.id,
                    resource = %job.resource,
                    returned = %outcome.resource,
                    "Executor returned an outcome for a different job"
                );
                TransferOutcome::failure(
                    &job,
                    FailureKind::Unexpected,
                    format!(
                        "repo {}: executor returned outcome for {}",
                        job.resource, outcome.resource
                    ),
                    outcome.status,
                )
            }
            Err(join_err) => {
                let reason = describe_join_error(join_err);
                TransferOutcome::failure(
                    &job,
                    FailureKind::Unexpected,
                    format!("repo {}: {}", job.resource, reason),
                    None,
                )
            }
        }
    }

    async fn publish(&self, outcome: TransferOutcome) {
        let outcome = outcome.completed_by(self.id, self.ctx.time_provider.now_millis());
        self.ctx.reporter.job_completed(&outcome);

        if let Err(e) = self.outcomes.send(outcome).await {
            error!(
                worker_id = self.id,
                resource = %e.0.resource,
                "Outcome channel closed before the run finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransferJob;
    use crate::port::reporter::mocks::RecordingReporter;
    use crate::port::time_provider::SystemTimeProvider;
    use crate::port::transfer_executor::mocks::{MockBehavior, MockTransferExecutor};
    use std::time::Duration;

    fn jobs(names: &[&str]) -> Vec<TransferJob> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| TransferJob::new(i, *n, "alice", "bob").unwrap())
            .collect()
    }

    fn context(executor: Arc<MockTransferExecutor>) -> (WorkerContext, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let ctx = WorkerContext {
            executor,
            credential: Arc::new(Credential::new("test-token").unwrap()),
            reporter: reporter.clone(),
            time_provider: Arc::new(SystemTimeProvider),
        };
        (ctx, reporter)
    }

    #[tokio::test]
    async fn test_single_worker_drains_queue() {
        let executor = Arc::new(
            MockTransferExecutor::new_success().with_resource("gone", MockBehavior::Status(404)),
        );
        let (ctx, reporter) = context(executor.clone());
        let queue = JobQueue::seed(jobs(&["a", "gone", "c"])).unwrap();
        let (tx, mut rx) = mpsc::channel(3);
        let (_shutdown_tx, token) = shutdown_channel();

        let processed = TransferWorker::new(1, queue, ctx, tx).run(token).await;

        assert_eq!(processed, 3);
        assert_eq!(executor.call_count(), 3);
        let mut outcomes = vec![];
        while let Some(o) = rx.recv().await {
            outcomes.push(o);
        }
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.worker_id == Some(1)));
        assert!(outcomes.iter().all(|o| o.completed_at.is_some()));
        assert_eq!(
            outcomes[1].failure_kind(),
            Some(crate::domain::FailureKind::NotFound)
        );
        assert_eq!(reporter.outcomes().len(), 3);
    }

    #[tokio::test]
    async fn test_panicking_executor_yields_one_outcome() {
        let executor = Arc::new(
            MockTransferExecutor::new_success()
                .with_resource("bad", MockBehavior::Panic("executor exploded".to_string())),
        );
        let (ctx, _reporter) = context(executor);
        let queue = JobQueue::seed(jobs(&["bad", "good"])).unwrap();
        let (tx, mut rx) = mpsc::channel(2);
        let (_shutdown_tx, token) = shutdown_channel();

        let processed = TransferWorker::new(1, queue, ctx, tx).run(token).await;
        assert_eq!(processed, 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.resource, "bad");
        assert_eq!(first.failure_kind(), Some(FailureKind::Unexpected));
        assert!(first.detail().unwrap().contains("executor exploded"));

        let second = rx.recv().await.unwrap();
        assert!(second.is_success());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_and_queued() {
        let executor = Arc::new(MockTransferExecutor::new(MockBehavior::Hang));
        let (ctx, _reporter) = context(executor.clone());
        let queue = JobQueue::seed(jobs(&["a", "b", "c"])).unwrap();
        let (tx, mut rx) = mpsc::channel(3);
        let (shutdown_tx, token) = shutdown_channel();

        let handle = tokio::spawn(TransferWorker::new(1, queue, ctx, tx).run(token));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.shutdown();

        let processed = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker must stop after shutdown")
            .unwrap();
        assert_eq!(processed, 3);
        assert_eq!(executor.call_count(), 1);

        let mut kinds = vec![];
        while let Some(o) = rx.recv().await {
            kinds.push(o.failure_kind());
        }
        assert_eq!(kinds, vec![Some(FailureKind::Cancelled); 3]);
    }

    #[tokio::test]
    async fn test_job_claimed_after_shutdown_is_not_sent() {
        let executor = Arc::new(MockTransferExecutor::new_success());
        let (ctx, _reporter) = context(executor.clone());
        let queue = JobQueue::seed(vec![]).unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let (shutdown_tx, mut token) = shutdown_channel();
        shutdown_tx.shutdown();

        let worker = TransferWorker::new(1, queue, ctx, tx);
        let job = jobs(&["late"]).remove(0);
        let outcome = worker.process(job, &mut token).await;

        assert_eq!(outcome.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(outcome.attempts, 0);
        assert_eq!(executor.call_count(), 0);
    }
}
