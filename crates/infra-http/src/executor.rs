// HTTP transfer executor

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, info, warn};

use repo_transfer_core::application::retry::{RetryDecision, RetryPolicy};
use repo_transfer_core::domain::{classify_response, Credential, TransferJob, TransferOutcome};
use repo_transfer_core::error::{AppError, Result};
use repo_transfer_core::port::TransferExecutor;

use crate::config::ApiConfig;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

#[derive(Serialize)]
struct TransferBody<'a> {
    new_owner: &'a str,
    new_name: &'a str,
}

/// POSTs `/repos/{owner}/{repo}/transfer` with transport-level retry
///
/// One `reqwest::Client` is shared by every worker; it is cheap to clone and
/// pools connections internally.
#[derive(Clone)]
pub struct HttpTransferExecutor {
    client: Client,
    base_url: Url,
    config: ApiConfig,
    retry: RetryPolicy,
}

impl HttpTransferExecutor {
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("invalid API URL {:?}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API URL {:?} cannot be used as a base URL",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::new(config.retry.clone()),
            config,
        })
    }

    /// `<base>/repos/<source>/<resource>/transfer`, path segments percent-encoded
    pub fn transfer_url(&self, job: &TransferJob) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "repos",
                job.source_account.as_str(),
                job.resource.as_str(),
                "transfer",
            ]);
        }
        url
    }

    /// One attempt. `Err` only when no HTTP response was received.
    async fn send_once(
        &self,
        url: &Url,
        job: &TransferJob,
        credential: &Credential,
    ) -> std::result::Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(AUTHORIZATION, format!("Bearer {}", credential.expose()))
            .header(API_VERSION_HEADER, self.config.api_version.as_str())
            .header(CONTENT_TYPE, "application/json")
            .json(&TransferBody {
                new_owner: &job.destination_account,
                new_name: &job.resource,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        // A status was received, so the request reached the API: a body read
        // failure must not trigger a resend of a possibly accepted transfer
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable response body: {}>", e),
        };
        Ok((status, body))
    }
}

#[async_trait]
impl TransferExecutor for HttpTransferExecutor {
    async fn execute(&self, job: &TransferJob, credential: &Credential) -> TransferOutcome {
        let url = self.transfer_url(job);
        info!(
            resource = %job.resource,
            new_owner = %job.destination_account,
            url = %url,
            "Attempting to transfer repository"
        );

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.send_once(&url, job, credential).await {
                Ok((status, body)) => {
                    debug!(resource = %job.resource, status, attempts, "Transfer response received");
                    return classify_response(job, status, &body).with_attempts(attempts);
                }
                Err(e) => {
                    let cause = error_chain(&e);
                    warn!(
                        resource = %job.resource,
                        attempt = attempts,
                        timeout = e.is_timeout(),
                        error = %cause,
                        "Transfer request failed"
                    );
                    match self.retry.should_retry(attempts) {
                        RetryDecision::Retry(delay) => tokio::time::sleep(delay).await,
                        RetryDecision::Failed => {
                            return TransferOutcome::transport_error(job, attempts, cause);
                        }
                    }
                }
            }
        }
    }
}

/// `err` followed by every `source()` below it, joined with ": "
///
/// reqwest's own `Display` stops at "error sending request", which hides
/// whether the cause was a refused connection, DNS or a timeout.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl std::fmt::Debug for HttpTransferExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransferExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.config.api_version)
            .field("max_attempts", &self.retry.max_attempts())
            .finish()
    }
}
