//! HTTP submission of group creation requests.
//!
//! The containers API accepts a creation request as a `POST` to
//! `{containers}:{port}/v3/containers/groups`, authenticated with the bearer
//! token and space GUID from the local credential store. Any status of 400 or
//! above is a rejection; there are no retries at this layer.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{error, info};

use crate::error::SubmitError;

const APPLICATION_JSON: &str = "application/json";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const PROJECT_ID_HEADER: &str = "X-Auth-Project-Id";
const FIRST_REJECTED_STATUS: u16 = 400;

/// A fully resolved creation request ready to send.
#[derive(Clone, PartialEq, Eq)]
pub struct Submission {
    /// Target URL of the group collection.
    pub url: String,
    /// Compact, key-sorted JSON body.
    pub body: String,
    /// Bearer token without its `bearer ` prefix.
    pub token: String,
    /// GUID of the targeted space.
    pub space_id: String,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("url", &self.url)
            .field("body", &self.body)
            .field("token", &"<redacted>")
            .field("space_id", &self.space_id)
            .finish()
    }
}

/// Status code and body returned by the containers API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl SubmitResponse {
    /// Whether the API rejected the request.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.status >= FIRST_REJECTED_STATUS
    }
}

/// Boxed future type returned by [`GroupSubmitter`] implementors.
pub type SubmitFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SubmitResponse, SubmitError>> + Send + 'a>>;

/// Behaviour required to deliver a creation request.
///
/// This abstraction keeps the status policy testable without a network.
pub trait GroupSubmitter {
    /// Send `submission` and return whatever status the server answered with.
    fn post(&self, submission: Submission) -> SubmitFuture<'_>;
}

/// [`GroupSubmitter`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    /// Create a submitter with a fresh client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a submitter around an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl GroupSubmitter for HttpSubmitter {
    fn post(&self, submission: Submission) -> SubmitFuture<'_> {
        Box::pin(async move {
            let transport = |error: reqwest::Error| SubmitError::TransportFailed {
                url: submission.url.clone(),
                message: error.to_string(),
            };

            let response = self
                .client
                .post(&submission.url)
                .header(CONTENT_TYPE, APPLICATION_JSON)
                .header(ACCEPT, APPLICATION_JSON)
                .header(AUTH_TOKEN_HEADER, &submission.token)
                .header(PROJECT_ID_HEADER, &submission.space_id)
                .body(submission.body.clone())
                .send()
                .await
                .map_err(transport)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport)?;
            Ok(SubmitResponse { status, body })
        })
    }
}

/// Submit a creation request and apply the rejection policy (async version).
///
/// Returns the response body on success.
///
/// # Errors
///
/// Returns [`SubmitError::RemoteRejected`] for a status of 400 or above and
/// [`SubmitError::TransportFailed`] when the request cannot be delivered.
pub async fn submit_group_async<S: GroupSubmitter>(
    submitter: &S,
    submission: &Submission,
) -> Result<String, SubmitError> {
    info!(url = %submission.url, "submitting group creation request");
    let response = submitter.post(submission.clone()).await?;

    if response.is_rejected() {
        error!(
            status = response.status,
            body = %response.body,
            "group creation request rejected"
        );
        return Err(SubmitError::RemoteRejected {
            status: response.status,
            body: response.body,
        });
    }

    info!(status = response.status, "group creation request accepted");
    Ok(response.body)
}

/// Submit a creation request and apply the rejection policy.
///
/// This synchronous helper blocks on [`submit_group_async`] using an existing
/// Tokio runtime handle supplied by the caller.
///
/// # Errors
///
/// See [`submit_group_async`].
pub fn submit_group<S: GroupSubmitter>(
    runtime: &tokio::runtime::Handle,
    submitter: &S,
    submission: &Submission,
) -> Result<String, SubmitError> {
    runtime.block_on(submit_group_async(submitter, submission))
}
