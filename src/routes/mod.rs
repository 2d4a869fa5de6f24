use crate::state::AppState;
use axum::Router;

pub mod docs;
pub mod health;
pub mod site;
pub mod waitlist;

pub fn build_router(app_state: &AppState) -> Router {
    let api = Router::new()
        .merge(waitlist::create_router())
        .merge(site::create_router());

    Router::new()
        .merge(health::create_router().with_state(app_state.clone()))
        .merge(crate::metrics::create_router().with_state(app_state.clone()))
        .nest("/api", api.with_state(app_state.clone()))
        .nest("/docs", docs::create_router())
}
