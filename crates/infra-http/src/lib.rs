// Repo Transfer Infrastructure - HTTP Adapter
// Implements: TransferExecutor

pub mod config;
pub mod executor;

pub use config::ApiConfig;
pub use executor::HttpTransferExecutor;
