// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Only `Config` and `Credential` are fatal to a run. Per-job failures never
/// surface here; they are recorded as `TransferOutcome`s.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors that abort a run before any job is dispatched
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Credential(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_only_pre_run_errors_are_fatal() {
        assert!(AppError::Config("empty list".into()).is_fatal_config());
        assert!(AppError::Credential("missing".into()).is_fatal_config());
        assert!(!AppError::InvalidState("twice".into()).is_fatal_config());
        assert!(!AppError::Internal("queue".into()).is_fatal_config());
        assert!(!AppError::from(DomainError::InvalidWorkerCount(0)).is_fatal_config());
    }
}
