// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - gpd.rs: Message and file ingestion endpoints
// - health.rs: Liveness, readiness and metrics endpoints
// - middleware.rs: Request id and request logging
//
// ============================================================================

mod gpd;
mod health;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    let body_limit = app_context.config.max_upload_bytes;

    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        // Ingestion
        .route("/send/gpd/message", post(gpd::send_message))
        .route("/send/gpd/file", post(gpd::send_file))
        .layer(DefaultBodyLimit::max(body_limit))
        // Apply middleware (first added runs first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_id))
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(app_context)
}
