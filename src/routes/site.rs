use crate::{
    configuration::{SiteSettings, SocialLink},
    domain::Countdown,
    state::AppState,
};
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use utoipa::ToSchema;

pub fn create_router() -> Router<AppState> {
    Router::new().route("/site", get(site_info))
}

/// Everything the landing page needs to render the brand and the countdown.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct SiteInfo {
    name: String,
    tagline: String,
    launch_date: DateTime<Utc>,
    countdown: Countdown,
    socials: Vec<SocialLink>,
    contact_email: String,
    address: String,
}

impl SiteInfo {
    fn at(site: &SiteSettings, now: DateTime<Utc>) -> Self {
        Self {
            name: site.name().clone(),
            tagline: site.tagline().clone(),
            launch_date: *site.launch_date(),
            countdown: Countdown::until(*site.launch_date(), now),
            // Links without a URL are not shown on the page.
            socials: site
                .socials()
                .iter()
                .filter(|social| !social.url().is_empty())
                .cloned()
                .collect(),
            contact_email: site.contact_email().clone(),
            address: site.address().clone(),
        }
    }
}

/// Brand details and the time left until launch.
#[tracing::instrument(skip(site))]
#[utoipa::path(
    get,
    path = "/api/site",
    responses((status = OK, description = "Brand details and launch countdown", body = SiteInfo))
)]
pub async fn site_info(State(site): State<Arc<SiteSettings>>) -> Json<SiteInfo> {
    Json(SiteInfo::at(&site, Utc::now()))
}
