// Transfer Request - validated input for a run

use crate::domain::TransferJob;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Input record for a run
///
/// Legacy key names (`originalUser`, `newUser`,
/// `repositories`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(alias = "originalUser")]
    pub original_account: String,

    #[serde(alias = "newUser")]
    pub new_account: String,

    #[serde(alias = "repositories")]
    pub resources: Vec<String>,
}

impl TransferRequest {
    pub fn new(
        original_account: impl Into<String>,
        new_account: impl Into<String>,
        resources: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            original_account: original_account.into(),
            new_account: new_account.into(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let request: TransferRequest = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("malformed transfer request: {}", e)))?;
        validate_request(&request)?;
        Ok(request)
    }

    /// One job per resource, in input order. Duplicates stay separate jobs.
    pub fn into_jobs(self) -> Result<Vec<TransferJob>> {
        validate_request(&self)?;
        let TransferRequest {
            original_account,
            new_account,
            resources,
        } = self;

        resources
            .into_iter()
            .enumerate()
            .map(|(seq, resource)| {
                TransferJob::new(seq, resource, original_account.as_str(), new_account.as_str())
                    .map_err(|e| AppError::Config(e.to_string()))
            })
            .collect()
    }
}

/// Validate a request before any job is created
pub fn validate_request(req: &TransferRequest) -> Result<()> {
    validate_account("originalAccount", &req.original_account)?;
    validate_account("newAccount", &req.new_account)?;

    if req.resources.is_empty() {
        return Err(AppError::Config(
            "resources list cannot be empty".to_string(),
        ));
    }

    for (i, name) in req.resources.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(AppError::Config(format!(
                "resource at position {} is empty",
                i
            )));
        }
        if name.trim() != name {
            return Err(AppError::Config(format!(
                "resource {:?} has leading or trailing whitespace",
                name
            )));
        }
        if name.contains('/') {
            return Err(AppError::Config(format!(
                "resource {:?} must be a bare repository name, not a path",
                name
            )));
        }
    }

    Ok(())
}

fn validate_account(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Config(format!("{} must be specified", field)));
    }
    if value.contains('/') || value.trim() != value {
        return Err(AppError::Config(format!(
            "{} {:?} is not a valid account name",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spec_keys() {
        let req = TransferRequest::from_json(
            r#"{"originalAccount": "alice", "newAccount": "acme", "resources": ["a", "b"]}"#,
        )
        .unwrap();
        assert_eq!(req.original_account, "alice");
        assert_eq!(req.new_account, "acme");
        assert_eq!(req.resources, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_legacy_keys() {
        let req = TransferRequest::from_json(
            r#"{"originalUser": "alice", "newUser": "acme", "repositories": ["a"]}"#,
        )
        .unwrap();
        assert_eq!(req.original_account, "alice");
        assert_eq!(req.resources, vec!["a"]);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = TransferRequest::from_json(r#"{"originalAccount": "alice""#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let err =
            TransferRequest::from_json(r#"{"originalAccount": "alice", "resources": ["a"]}"#)
                .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_empty_resources() {
        let req = TransferRequest::new("alice", "acme", Vec::<String>::new());
        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_empty_accounts() {
        let req = TransferRequest::new("", "acme", ["a"]);
        assert!(validate_request(&req)
            .unwrap_err()
            .to_string()
            .contains("originalAccount"));

        let req = TransferRequest::new("alice", "  ", ["a"]);
        assert!(validate_request(&req)
            .unwrap_err()
            .to_string()
            .contains("newAccount"));
    }

    #[test]
    fn test_validate_bad_resource_names() {
        for bad in ["", "  ", " padded", "owner/repo"] {
            let req = TransferRequest::new("alice", "acme", ["ok", bad]);
            assert!(validate_request(&req).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_into_jobs_keeps_order_and_duplicates() {
        let req = TransferRequest::new("alice", "acme", ["x", "y", "x"]);
        let jobs = req.into_jobs().unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].resource, "x");
        assert_eq!(jobs[2].resource, "x");
        assert_eq!(jobs[2].seq, 2);
        assert!(jobs
            .iter()
            .all(|j| j.source_account == "alice" && j.destination_account == "acme"));
    }
}
