use crate::{
    domain::WaitlistEmail,
    metrics::{Metrics, Outcome},
    state::AppState,
    store::{InsertError, WaitlistStore},
};
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/waitlist", post(join_waitlist))
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct JoinRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "ursula_le_guin@gmail.com")]
    email: Value,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct Joined {
    ok: bool,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorMessage {
    message: String,
}

/// Put an email address on the waitlist.
#[tracing::instrument(
    name = "Adding a new waitlist entry",
    skip(store, metrics, body),
    fields(waitlist_email = tracing::field::Empty)
)]
#[utoipa::path(
    post,
    path = "/api/waitlist",
    request_body = JoinRequest,
    responses(
        (status = OK, description = "The email was added to the waitlist", body = Joined),
        (status = BAD_REQUEST, description = "The email is malformed", body = ErrorMessage),
        (status = CONFLICT, description = "The email is already on the waitlist", body = ErrorMessage),
        (status = INTERNAL_SERVER_ERROR, description = "The body is not JSON or the entry could not be saved", body = ErrorMessage),
    )
)]
pub async fn join_waitlist(
    State(store): State<Arc<dyn WaitlistStore>>,
    State(metrics): State<Arc<Metrics>>,
    body: Bytes,
) -> Result<Json<Joined>, WaitlistError> {
    let result = join(store.as_ref(), &body).await;
    metrics.record_submission(match &result {
        Ok(()) => Outcome::Accepted,
        Err(e) => e.outcome(),
    });

    result.map(|()| Json(Joined { ok: true }))
}

async fn join(store: &dyn WaitlistStore, body: &[u8]) -> Result<(), WaitlistError> {
    let body: Value = serde_json::from_slice(body)
        .context("Failed to parse the request body as JSON")
        .map_err(WaitlistError::InternalError)?;
    let raw_email = email_field(&body)?
        .map(coerce_to_string)
        .unwrap_or_default();
    let email = WaitlistEmail::parse(&raw_email).map_err(WaitlistError::ValidationError)?;
    tracing::Span::current().record("waitlist_email", &tracing::field::display(&email));

    store.insert(&email).await.map_err(|e| match e {
        InsertError::Duplicate(_) => WaitlistError::ConflictError(e),
        InsertError::Unexpected(_) => WaitlistError::InternalError(e.into()),
    })
}

/// The `email` field of the request body. Only an object carries fields,
/// any other body is treated as having no email. A `null` body has nothing
/// to read fields from at all.
fn email_field(body: &Value) -> Result<Option<&Value>, WaitlistError> {
    match body {
        Value::Object(fields) => Ok(fields.get("email")),
        Value::Null => Err(WaitlistError::InternalError(anyhow::anyhow!(
            "The request body is `null`"
        ))),
        _ => Ok(None),
    }
}

/// The `email` field has no fixed type on the wire. Falsy values (`null`,
/// `false`, `0`, `""`) are empty, everything else takes its textual form.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        _ => as_text(value),
    }
}

/// Arrays join their elements with `,`, with `null` elements left empty.
fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(as_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Represent the different ways joining the waitlist can fail.
/// The displayed message is what the caller receives.
#[derive(thiserror::Error)]
pub enum WaitlistError {
    #[error("Invalid email")]
    ValidationError(String),
    #[error("Already on the list")]
    ConflictError(#[source] InsertError),
    #[error("Server error")]
    InternalError(#[source] anyhow::Error),
}

impl WaitlistError {
    fn outcome(&self) -> Outcome {
        match self {
            Self::ValidationError(_) => Outcome::Invalid,
            Self::ConflictError(_) => Outcome::Duplicate,
            Self::InternalError(_) => Outcome::Error,
        }
    }
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ValidationError(reason) => {
                tracing::warn!(reason = %reason, "Rejected waitlist submission");
                StatusCode::BAD_REQUEST
            }
            Self::ConflictError(e) => {
                tracing::info!("{e}");
                StatusCode::CONFLICT
            }
            Self::InternalError(_) => {
                tracing::error!(error.cause_chain = ?self, "Failed to add waitlist entry");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorMessage {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
