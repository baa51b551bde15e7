use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // ICE configuration for capture clients
        .route("/rtc-config", get(handlers::get_rtc_config))
        // Session control
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions/:session_id/stop", post(handlers::stop_session))
        // Session queries
        .route(
            "/sessions/:session_id/status",
            get(handlers::get_session_status),
        )
        .route(
            "/sessions/:session_id/history",
            get(handlers::get_session_history),
        )
        .route(
            "/sessions/:session_id/clear",
            post(handlers::clear_session_history),
        )
        .route("/sessions/:session_id/query", post(handlers::submit_query))
        // Browser capture clients fetch rtc-config cross-origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
