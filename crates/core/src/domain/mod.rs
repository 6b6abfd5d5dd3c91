// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod outcome;
pub mod pool;
pub mod run;
pub mod summary;

// Re-exports
pub use error::DomainError;
pub use job::{Credential, TransferJob};
pub use outcome::{classify_response, FailureKind, OutcomeKind, TransferOutcome};
pub use pool::{PoolConfig, RetryConfig};
pub use run::RunState;
pub use summary::RunSummary;
