//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // ASNs
        .route("/bgpq/asn", get(handlers::list_asns))
        .route("/bgpq/asn/", get(handlers::list_asns))
        .route("/bgpq/asn/:asn", get(handlers::get_asn))
        // AS-SETs
        .route("/bgpq/as-set", get(handlers::list_as_sets))
        .route("/bgpq/as-set/", get(handlers::list_as_sets))
        .route("/bgpq/as-set/:as_set", get(handlers::get_as_set))
        .with_state(state)
}
