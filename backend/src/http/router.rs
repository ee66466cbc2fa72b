//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; restrict at the reverse proxy in production.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Assignments
        .route(
            "/assignments",
            get(handlers::list_assignments).post(handlers::create_assignment),
        )
        .route(
            "/assignments/{id}",
            patch(handlers::update_assignment).delete(handlers::delete_assignment),
        )
        .route("/assignments/validate", post(handlers::validate_assignment))
        .route("/assignments/replicate", post(handlers::replicate_assignment))
        // Workload
        .route("/workload/course", get(handlers::course_workload))
        .route(
            "/workload/instructors/{id}",
            get(handlers::instructor_workload),
        )
        // Conflict log
        .route("/conflicts/pending", get(handlers::list_pending_conflicts))
        .route("/conflicts/{id}/resolve", post(handlers::resolve_conflict));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(1024 * 1024))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
