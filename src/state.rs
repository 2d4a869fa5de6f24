use crate::{configuration::SiteSettings, metrics::Metrics, store::WaitlistStore};
use axum::extract::FromRef;
use derive_getters::Getters;
use duplicate::duplicate_item;
use std::sync::Arc;

#[derive(Debug, Clone, Getters)]
pub struct AppState {
    store: Arc<dyn WaitlistStore>,
    site: Arc<SiteSettings>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn create(store: Arc<dyn WaitlistStore>, site: SiteSettings, metrics: Metrics) -> Self {
        Self {
            store,
            site: Arc::new(site),
            metrics: Arc::new(metrics),
        }
    }
}

#[duplicate_item(
    service_type            field;
    [ dyn WaitlistStore ]   [ store ];
    [ SiteSettings ]        [ site ];
    [ Metrics ]             [ metrics ];
)]
impl FromRef<AppState> for Arc<service_type> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.field.clone()
    }
}
