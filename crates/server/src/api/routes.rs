use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{catalog, handlers, middleware::metrics_middleware, objects, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog queries
        .route("/search", get(catalog::search))
        .route("/catalog/stats", get(catalog::get_stats))
        // Objects
        .route("/objects/{id}", get(objects::get_object))
        .route("/objects/{id}/url", get(objects::get_object_url))
        // Sync
        .route("/sync", post(sync::trigger_sync))
        .route("/sync/status", get(sync::get_status));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
