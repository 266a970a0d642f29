//! Route configuration.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/{domain}", get(handlers::list_page))
        .route("/api/{domain}/record", get(handlers::get_record))
        .route("/api/{domain}/views", post(handlers::increment_views))
        .route("/api/{domain}/views/lookup", post(handlers::lookup_views))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
