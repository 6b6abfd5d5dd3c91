// Transfer Outcome Domain Model

use crate::domain::TransferJob;
use serde::{Deserialize, Serialize};

/// Upper bound for the response body kept on a failed outcome (bytes)
pub const MAX_BODY_EXCERPT_BYTES: usize = 1024;

/// Classification of a failed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// 401: token invalid or expired
    Unauthorized,
    /// 403: rate limited or insufficient scope
    Forbidden,
    /// 404: source account or repository does not exist
    NotFound,
    /// 422: semantic validation error on the remote side
    Unprocessable,
    /// Any other status code
    Unexpected,
    /// Request could not be delivered after all attempts
    TransportError,
    /// Run was cancelled before this job reached the remote API
    Cancelled,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Unauthorized => write!(f, "UNAUTHORIZED"),
            FailureKind::Forbidden => write!(f, "FORBIDDEN"),
            FailureKind::NotFound => write!(f, "NOT_FOUND"),
            FailureKind::Unprocessable => write!(f, "UNPROCESSABLE"),
            FailureKind::Unexpected => write!(f, "UNEXPECTED"),
            FailureKind::TransportError => write!(f, "TRANSPORT_ERROR"),
            FailureKind::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Terminal result of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure { kind: FailureKind, detail: String },
}

impl OutcomeKind {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Success)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            OutcomeKind::Success => None,
            OutcomeKind::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Outcome record produced exactly once per job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub seq: usize,
    pub resource: String,
    pub outcome: OutcomeKind,
    pub status: Option<u16>,
    pub body_excerpt: Option<String>,
    pub attempts: u32,
    pub worker_id: Option<usize>,
    pub completed_at: Option<i64>, // epoch ms
}

impl TransferOutcome {
    fn new(job: &TransferJob, outcome: OutcomeKind, status: Option<u16>) -> Self {
        Self {
            seq: job.seq,
            resource: job.resource.clone(),
            outcome,
            status,
            body_excerpt: None,
            attempts: 1,
            worker_id: None,
            completed_at: None,
        }
    }

    pub fn success(job: &TransferJob, status: u16) -> Self {
        Self::new(job, OutcomeKind::Success, Some(status))
    }

    pub fn failure(
        job: &TransferJob,
        kind: FailureKind,
        detail: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::new(
            job,
            OutcomeKind::Failure {
                kind,
                detail: detail.into(),
            },
            status,
        )
    }

    /// Request never got an HTTP response
    pub fn transport_error(job: &TransferJob, attempts: u32, error: impl std::fmt::Display) -> Self {
        let detail = format!(
            "repo {}: failed to send transfer request after {} attempt(s): {}",
            job.resource, attempts, error
        );
        Self::failure(job, FailureKind::TransportError, detail, None).with_attempts(attempts)
    }

    pub fn cancelled(job: &TransferJob) -> Self {
        let detail = format!("repo {}: run cancelled before transfer completed", job.resource);
        Self::failure(job, FailureKind::Cancelled, detail, None).with_attempts(0)
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Stamp worker id and completion time (set by the worker that owned the job)
    pub fn completed_by(mut self, worker_id: usize, now_millis: i64) -> Self {
        self.worker_id = Some(worker_id);
        self.completed_at = Some(now_millis);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.outcome.failure_kind()
    }

    pub fn detail(&self) -> Option<&str> {
        match &self.outcome {
            OutcomeKind::Success => None,
            OutcomeKind::Failure { detail, .. } => Some(detail),
        }
    }
}

/// Map an HTTP response onto an outcome.
///
/// Pure function of (job, status, body): the same inputs always produce the
/// same outcome kind and detail.
pub fn classify_response(job: &TransferJob, status: u16, body: &str) -> TransferOutcome {
    let repo = &job.resource;
    let excerpt = excerpt(body);

    let (kind, detail) = match status {
        202 => return TransferOutcome::success(job, status),
        401 => (
            FailureKind::Unauthorized,
            format!(
                "repo {}: Unauthorized (HTTP {}). Check token and permissions. Response: {}",
                repo, status, excerpt
            ),
        ),
        403 => (
            FailureKind::Forbidden,
            format!(
                "repo {}: Forbidden (HTTP {}). API rate limits or insufficient permissions. Response: {}",
                repo, status, excerpt
            ),
        ),
        404 => (
            FailureKind::NotFound,
            format!(
                "repo {}: Repository or account not found (HTTP {}). Response: {}",
                repo, status, excerpt
            ),
        ),
        422 => (
            FailureKind::Unprocessable,
            format!(
                "repo {}: Unprocessable Entity (HTTP {}). Semantic errors. Response: {}",
                repo, status, excerpt
            ),
        ),
        _ => (
            FailureKind::Unexpected,
            format!(
                "repo {}: Unexpected status code (HTTP {}). Response: {}",
                repo, status, excerpt
            ),
        ),
    };

    let mut outcome = TransferOutcome::failure(job, kind, detail, Some(status));
    outcome.body_excerpt = Some(excerpt);
    outcome
}

/// Trim and cut the body to `MAX_BODY_EXCERPT_BYTES` on a char boundary
pub fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_BODY_EXCERPT_BYTES {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
