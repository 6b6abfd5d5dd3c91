// Application Layer - Use Cases and Orchestration

pub mod aggregator;
pub mod coordinator;
pub mod dispatcher;
pub mod request;
pub mod retry;
pub mod worker;

// Re-exports
pub use aggregator::ResultAggregator;
pub use coordinator::RunCoordinator;
pub use dispatcher::{JobDispatcher, JobQueue};
pub use request::{validate_request, TransferRequest};
pub use retry::{RetryDecision, RetryPolicy};
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, TransferWorker, WorkerContext};
