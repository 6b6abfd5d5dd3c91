// Run Coordinator - wires queue, worker pool and aggregator for one run

use crate::application::aggregator::ResultAggregator;
use crate::application::dispatcher::{JobDispatcher, JobQueue};
use crate::application::request::TransferRequest;
use crate::application::worker::{shutdown_channel, ShutdownToken, WorkerContext};
use crate::domain::{Credential, PoolConfig, RunState, RunSummary};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, OutcomeReporter, TimeProvider, TransferExecutor};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Drives one run through `Idle -> Dispatching -> AwaitingWorkers -> Aggregating -> Done`
///
/// A coordinator is single-use: calling `run` again after it left `Idle`
/// fails with `AppError::InvalidState`.
pub struct RunCoordinator {
    config: PoolConfig,
    executor: Arc<dyn TransferExecutor>,
    reporter: Arc<dyn OutcomeReporter>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    state: RunState,
}

impl RunCoordinator {
    pub fn new(
        config: PoolConfig,
        executor: Arc<dyn TransferExecutor>,
        reporter: Arc<dyn OutcomeReporter>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            executor,
            reporter,
            time_provider,
            id_provider,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run to completion with no external cancellation
    pub async fn run(&mut self, request: TransferRequest, token: &str) -> Result<RunSummary> {
        let (_shutdown_tx, shutdown) = shutdown_channel();
        self.run_with_shutdown(request, token, shutdown).await
    }

    /// Run until every job has an outcome, or until `shutdown` fires or the
    /// configured run deadline passes, in which case the remaining jobs are
    /// reported as cancelled.
    pub async fn run_with_shutdown(
        &mut self,
        request: TransferRequest,
        token: &str,
        shutdown: ShutdownToken,
    ) -> Result<RunSummary> {
        if self.state != RunState::Idle {
            return Err(AppError::InvalidState(format!(
                "coordinator already used (state {})",
                self.state
            )));
        }

        // Fatal checks: nothing is dispatched unless all of them pass
        let credential = match Credential::new(token) {
            Ok(c) => c,
            Err(e) => {
                self.state.transition(RunState::CredentialError)?;
                error!(error = %e, "Missing or empty credential, aborting run");
                return Err(AppError::Credential(e.to_string()));
            }
        };
        let jobs = self
            .config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
            .and_then(|()| request.into_jobs());
        let jobs = match jobs {
            Ok(jobs) => jobs,
            Err(e) => {
                self.state.transition(RunState::ConfigError)?;
                error!(error = %e, "Invalid run configuration, aborting run");
                return Err(e);
            }
        };

        self.state.transition(RunState::Dispatching)?;
        let run_id = self.id_provider.generate_id();
        let started_at = self.time_provider.now_millis();
        let total = jobs.len();
        info!(
            run_id = %run_id,
            jobs = total,
            workers = self.config.worker_count,
            "Distributing repository transfer jobs"
        );

        let queue = JobQueue::seed(jobs)?;
        let (outcome_tx, mut outcome_rx) = mpsc::channel(total.max(1));
        let (pool_shutdown_tx, pool_shutdown) = shutdown_channel();

        // Forward external cancellation and the run deadline to the pool
        let deadline = self.config.run_deadline;
        let mut external = shutdown;
        let watcher = tokio::spawn(async move {
            let expired = async {
                match deadline {
                    Some(d) => tokio::time::sleep(d).await,
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                _ = external.wait() => warn!("Shutdown requested, cancelling remaining transfers"),
                _ = expired => warn!(?deadline, "Run deadline exceeded, cancelling remaining transfers"),
            }
            pool_shutdown_tx.shutdown();
        });

        let ctx = WorkerContext {
            executor: Arc::clone(&self.executor),
            credential: Arc::new(credential),
            reporter: Arc::clone(&self.reporter),
            time_provider: Arc::clone(&self.time_provider),
        };
        let dispatcher = JobDispatcher::new(self.config.worker_count)?;
        let mut workers = dispatcher.spawn(queue, ctx, outcome_tx, pool_shutdown);
        self.state.transition(RunState::AwaitingWorkers)?;
        info!(run_id = %run_id, "All jobs dispatched. Waiting for workers to complete");

        let mut reported = 0;
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(count) => reported += count,
                Err(e) => error!(run_id = %run_id, error = %e, "Worker task failed"),
            }
        }
        watcher.abort();
        info!(run_id = %run_id, reported, "All workers have completed");

        self.state.transition(RunState::Aggregating)?;
        let mut aggregator = ResultAggregator::new(total);
        aggregator.drain(&mut outcome_rx).await?;
        let summary = aggregator.finish(run_id, started_at, self.time_provider.now_millis())?;

        self.state.transition(RunState::Done)?;
        self.reporter.run_completed(&summary);
        Ok(summary)
    }
}
