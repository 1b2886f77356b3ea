use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::observability::{observability_middleware, Metrics};
use crate::services::MenuCatalogStore;

pub mod api;
pub mod health;
pub mod metrics;

pub use api::*;
pub use health::*;
pub use metrics::*;

/// Assemble the public router: health and the catalog API, wrapped in request
/// tracing. Scrapes are served separately by [`create_metrics_router`].
pub fn create_app(store: Arc<MenuCatalogStore>, metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/health/status", get(health_check))
        .merge(create_api_router(store))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics.clone(), req, next)
        }))
}
