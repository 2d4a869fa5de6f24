//! Client for the waitlist endpoint, as used by the signup form.
//!
//! When the endpoint is missing (404/405) or cannot be reached at all, the
//! signup is recorded in [`LocalStorage`] instead and reported as a success.
//! Every other failure status is surfaced as an error.

pub mod fallback;
mod form;

pub use form::NotifyForm;

use self::fallback::{record_signup, LocalRecord, LocalStorage};
use crate::domain::{looks_like_email, normalize};
use chrono::Utc;
use reqwest::{Client, Response, StatusCode, Url};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

pub const ACCEPTED_MESSAGE: &str = "Thanks! You're on the list.";
pub const DUPLICATE_MESSAGE: &str = "You're already on the list.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const WAITLIST_PATH: &str = "api/waitlist";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    Accepted,
    Duplicate,
    Rejected,
    Error,
}

/// What the user is told after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub status: SubmitStatus,
    pub message: String,
}

impl SubmitOutcome {
    fn accepted() -> Self {
        Self {
            status: SubmitStatus::Accepted,
            message: ACCEPTED_MESSAGE.to_string(),
        }
    }

    fn duplicate() -> Self {
        Self {
            status: SubmitStatus::Duplicate,
            message: DUPLICATE_MESSAGE.to_string(),
        }
    }

    fn rejected() -> Self {
        Self {
            status: SubmitStatus::Rejected,
            message: INVALID_EMAIL_MESSAGE.to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: SubmitStatus::Error,
            message,
        }
    }
}

/// Reasons for falling back to local storage.
#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Failed to reach the waitlist endpoint")]
    Transport(#[source] reqwest::Error),
    #[error("The waitlist endpoint is not available (status {0})")]
    EndpointMissing(StatusCode),
}

#[derive(Debug)]
pub struct WaitlistClient {
    endpoint: Url,
    http_client: Client,
    storage: Arc<dyn LocalStorage>,
    in_flight: AtomicBool,
}

impl WaitlistClient {
    /// Create a client for the service at `base_url`, which should end with a
    /// `/` if it carries a path. `storage` receives signups while the
    /// endpoint is unavailable.
    pub fn new(base_url: Url, storage: Arc<dyn LocalStorage>) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: base_url.join(WAITLIST_PATH)?,
            http_client: Client::new(),
            storage,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Whether a submission is currently in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit `raw_email` to the waitlist.
    ///
    /// Returns `None` without doing anything if another submission is still
    /// in flight.
    #[tracing::instrument(name = "Submitting email to the waitlist", skip(self))]
    pub async fn submit(&self, raw_email: &str) -> Option<SubmitOutcome> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Ignoring submission while another one is in flight");
            return None;
        };

        if !looks_like_email(raw_email) {
            return Some(SubmitOutcome::rejected());
        }

        let email = normalize(raw_email);
        let outcome = match self.send(&email).await {
            Ok(response) => interpret(response).await,
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Recording the signup locally");
                self.record_locally(&email)
            }
        };

        Some(outcome)
    }

    async fn send(&self, email: &str) -> Result<Response, SubmitError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&JoinRequest { email })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
                Err(SubmitError::EndpointMissing(response.status()))
            }
            _ => Ok(response),
        }
    }

    fn record_locally(&self, email: &str) -> SubmitOutcome {
        match record_signup(self.storage.as_ref(), email, Utc::now()) {
            Ok(LocalRecord::Added) => SubmitOutcome::accepted(),
            Ok(LocalRecord::AlreadyPresent) => SubmitOutcome::duplicate(),
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to record the signup locally");
                SubmitOutcome::accepted()
            }
        }
    }
}

async fn interpret(response: Response) -> SubmitOutcome {
    let status = response.status();
    if status == StatusCode::CONFLICT {
        return SubmitOutcome::duplicate();
    }
    if status.is_success() {
        return SubmitOutcome::accepted();
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    tracing::error!(%status, reason = %message, "Waitlist submission failed");

    SubmitOutcome::error(message)
}

#[derive(Debug, serde::Serialize)]
struct JoinRequest<'a> {
    email: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Marks a submission as in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
