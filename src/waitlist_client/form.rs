use super::{SubmitOutcome, SubmitStatus, WaitlistClient};
use crate::domain::looks_like_email;

/// State of the "notify me" form: the typed email, whether a submission is
/// running, and the last message shown to the user.
#[derive(Debug, Clone, Default)]
pub struct NotifyForm {
    email: String,
    message: Option<String>,
    is_error: bool,
    loading: bool,
}

impl NotifyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.loading || !looks_like_email(&self.email)
    }

    /// Submit the current email through `client` and show the outcome.
    /// Does nothing while the submit control is disabled.
    pub async fn submit(&mut self, client: &WaitlistClient) -> Option<SubmitStatus> {
        let email = self.begin_submit()?;
        let outcome = client.submit(&email).await;
        self.finish(outcome.as_ref());
        outcome.map(|outcome| outcome.status)
    }

    /// Mark the form as loading and hand out the email to submit, or `None`
    /// if the submit control is disabled. Must be followed by [`Self::finish`].
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.is_submit_disabled() {
            return None;
        }

        self.loading = true;
        Some(self.email.clone())
    }

    /// Leave the loading state and show `outcome`, if the submission
    /// produced one.
    pub fn finish(&mut self, outcome: Option<&SubmitOutcome>) {
        self.loading = false;
        let Some(outcome) = outcome else {
            return;
        };

        self.is_error = outcome.status == SubmitStatus::Error;
        self.message = Some(outcome.message.clone());
        if outcome.status == SubmitStatus::Accepted {
            self.email.clear();
        }
    }
}
