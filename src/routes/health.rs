use crate::{state::AppState, store::WaitlistStore};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;
use utoipa::ToSchema;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Create a router to serve health checks.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(is_alive))
        .route("/info", get(build_info))
        .route("/status", get(status))
}

/// Simple `is_alive` endpoint that will always return a 200 OK.
/// Used to indicate when the webserver is up and running.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Check if service is alive"))
)]
pub async fn is_alive() -> StatusCode {
    tracing::debug!("Service is alive");
    StatusCode::OK
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct Status {
    db_connected: bool,
}

/// Status endpoint to whether all required depedencies are working.
#[tracing::instrument(skip(store))]
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = OK, description = "Current status of all dependent services", body = Status)
    )
)]
pub async fn status(State(store): State<Arc<dyn WaitlistStore>>) -> Json<Status> {
    let status = Status {
        db_connected: store.is_reachable().await,
    };
    tracing::info!("Status: {:?}", status);
    Json(status)
}

#[derive(serde::Serialize, ToSchema)]
pub struct BuildInfo {
    version: &'static str,
    build_timestamp: &'static str,
}

/// Endpoint to get current information about the server's version.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/info",
    responses(
        (status = OK, description = "Build info for this service", body = BuildInfo)
    )
)]
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: VERSION,
        build_timestamp: BUILD_TIMESTAMP,
    })
}
