// Transfer Job Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// One unit of work: move a single repository to a new owner.
///
/// Immutable once created. `seq` is the position of the resource in the input
/// list and is only used for diagnostics, so duplicate names stay
/// distinguishable in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferJob {
    pub seq: usize,
    pub resource: String,
    pub source_account: String,
    pub destination_account: String,
}

impl TransferJob {
    /// Create a new job
    ///
    /// # Arguments
    ///
    /// * `seq` - Position in the input list (0-based)
    /// * `resource` - Repository name, must be non-empty
    /// * `source_account` - Current owner
    /// * `destination_account` - New owner
    pub fn new(
        seq: usize,
        resource: impl Into<String>,
        source_account: impl Into<String>,
        destination_account: impl Into<String>,
    ) -> Result<Self> {
        let resource = resource.into();
        let source_account = source_account.into();
        let destination_account = destination_account.into();

        if resource.trim().is_empty() {
            return Err(DomainError::ValidationError(format!(
                "resource name at position {} is empty",
                seq
            )));
        }
        if source_account.trim().is_empty() || destination_account.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "source and destination accounts must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            seq,
            resource,
            source_account,
            destination_account,
        })
    }
}

/// Opaque bearer token for the remote API.
///
/// Never printed: `Debug` is redacted so the token cannot leak through
/// structured logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::ValidationError(
                "credential must not be empty".to_string(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}
