use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Capture control
        .route("/capture/start", post(handlers::start_capture))
        .route("/capture/stop", post(handlers::stop_capture))
        .route("/capture/reconfigure", post(handlers::reconfigure_capture))
        // Queries
        .route("/capture/status", get(handlers::get_status))
        .route("/capture/transcript", get(handlers::get_transcript))
        .route(
            "/capture/transcript/export",
            get(handlers::export_transcript),
        )
        // The overlay widget calls in from page origins
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
