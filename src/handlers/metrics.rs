use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::models::EntryKind;
use crate::observability::Metrics;
use crate::services::MenuCatalogStore;

#[derive(Clone)]
pub struct MetricsState {
    pub metrics: Arc<Metrics>,
    pub store: Arc<MenuCatalogStore>,
}

/// Scrape router, bound on the dedicated metrics port
pub fn create_metrics_router(store: Arc<MenuCatalogStore>, metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState { metrics, store })
}

/// Refresh the catalog gauges from the store, then encode the registry
#[instrument(name = "metrics_scrape", skip_all)]
pub async fn metrics_handler(State(state): State<MetricsState>) -> Response {
    let (meals, drinks) = state.store.entry_counts().await;
    state
        .metrics
        .set_catalog_entries(EntryKind::Meal.table(), meals);
    state
        .metrics
        .set_catalog_entries(EntryKind::Drink.table(), drinks);
    debug!(meals, drinks, "Catalog gauges refreshed");

    match state.metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Metrics scrape failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
