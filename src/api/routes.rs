//! API Routes
//!
//! Configures the Axum router with all diagnostics endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_domain_handler, domain_stats_handler, get_handler, health_handler,
    set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Stats for every domain
/// - `GET /stats/:domain` - Stats for one domain
/// - `GET /cache/:domain/:key` - Read a value
/// - `PUT /cache/:domain/:key` - Store a value
/// - `DELETE /cache` - Clear every domain
/// - `DELETE /cache/:domain` - Clear one domain
///
/// # Middleware
/// - CORS: Allows any origin so a browser diagnostics panel can poll it
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:domain", get(domain_stats_handler))
        .route("/cache", delete(clear_all_handler))
        .route("/cache/:domain", delete(clear_domain_handler))
        .route("/cache/:domain/:key", get(get_handler).put(set_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
