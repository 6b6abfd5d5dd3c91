// Job Dispatcher - bounded job queue and fixed worker pool

use crate::application::worker::constants::FIRST_WORKER_ID;
use crate::application::worker::{ShutdownToken, TransferWorker, WorkerContext};
use crate::domain::{DomainError, TransferJob, TransferOutcome};
use crate::error::{AppError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::info;

/// Shared queue of undispatched jobs
///
/// Fed once at construction and closed immediately: no job can be added
/// afterwards, and `next` returns `None` once the queue is drained. Each job
/// is handed to exactly one caller.
#[derive(Clone)]
pub struct JobQueue {
    rx: Arc<Mutex<mpsc::Receiver<TransferJob>>>,
    seeded: usize,
}

impl JobQueue {
    /// Create a closed queue holding `jobs` in order
    pub fn seed(jobs: Vec<TransferJob>) -> Result<Self> {
        let seeded = jobs.len();
        let (tx, rx) = mpsc::channel(seeded.max(1));

        for job in jobs {
            tx.try_send(job)
                .map_err(|e| AppError::Internal(format!("failed to seed job queue: {}", e)))?;
        }
        // tx dropped here: the queue is closed

        Ok(Self {
            rx: Arc::new(Mutex::new(rx)),
            seeded,
        })
    }

    /// Number of jobs the queue was seeded with
    pub fn seeded(&self) -> usize {
        self.seeded
    }

    /// Claim the next job (first-available)
    pub async fn next(&self) -> Option<TransferJob> {
        self.rx.lock().await.recv().await
    }
}

/// Starts a fixed pool of workers over a `JobQueue`
pub struct JobDispatcher {
    worker_count: usize,
}

impl JobDispatcher {
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(DomainError::InvalidWorkerCount(worker_count).into());
        }
        Ok(Self { worker_count })
    }

    /// Spawn the pool. Each task resolves to the number of outcomes its worker
    /// published. The caller's `outcomes` sender is consumed so the channel
    /// closes once the last worker exits.
    pub fn spawn(
        &self,
        queue: JobQueue,
        ctx: WorkerContext,
        outcomes: mpsc::Sender<TransferOutcome>,
        shutdown: ShutdownToken,
    ) -> JoinSet<usize> {
        info!(
            workers = self.worker_count,
            jobs = queue.seeded(),
            "Starting worker pool"
        );

        let mut workers = JoinSet::new();
        for id in FIRST_WORKER_ID..FIRST_WORKER_ID + self.worker_count {
            let worker = TransferWorker::new(id, queue.clone(), ctx.clone(), outcomes.clone());
            workers.spawn(worker.run(shutdown.clone()));
        }
        workers
    }
}
