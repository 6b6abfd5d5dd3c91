// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod reporter;
pub mod time_provider;
pub mod transfer_executor;

// Re-exports
pub use id_provider::IdProvider;
pub use reporter::{OutcomeReporter, TracingReporter};
pub use time_provider::TimeProvider;
pub use transfer_executor::TransferExecutor;
