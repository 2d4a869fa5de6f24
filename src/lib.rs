pub mod configuration;
pub mod domain;
mod error;
mod metrics;
mod routes;
mod state;
pub mod store;
pub mod telemetry;
pub mod waitlist_client;

use axum::{body::Body, Router, Server};
use configuration::{DatabaseSettings, Settings};
use http::Request;
use metrics::Metrics;
use sqlx::{postgres::PgPoolOptions, PgPool};
use state::AppState;
use std::{net::TcpListener, sync::Arc, time::Duration};
use store::{PgWaitlistStore, WaitlistStore};

/// The waitlist service, bound to a port and ready to serve.
pub struct App {
    listener: TcpListener,
    router: Router,
    port: u16,
}

impl App {
    /// Build the app with a Postgres backed store from the given settings.
    pub fn build(config: Settings) -> anyhow::Result<Self> {
        let store = PgWaitlistStore::new(get_connection_pool(&config.database));
        Self::build_with_store(config, Arc::new(store))
    }

    /// Build the app around an already constructed store.
    pub fn build_with_store(
        config: Settings,
        store: Arc<dyn WaitlistStore>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.application.address())?;
        let port = listener.local_addr()?.port();

        let app_state = AppState::create(store, config.site, Metrics::new()?);
        let router = Self::build_router(&app_state);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    /// The port the app is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until the server is shut down.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Server running at {}", self.listener.local_addr()?);

        Server::from_tcp(self.listener)?
            .serve(self.router.into_make_service())
            .await?;
        Ok(())
    }

    /// Builder the router for the application.
    fn build_router(app_state: &AppState) -> Router {
        use tower_http::{
            request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
            trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
        };
        use tracing::Level;

        routes::build_router(app_state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or_default();
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }
}

/// Create a connection pool that connects lazily on first use.
pub fn get_connection_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(config.with_db())
}
