use super::handlers;
use super::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, frontend_origin: &str) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/generate-token", post(handlers::generate_token))
        .route("/start-agent", post(handlers::start_agent))
        .route("/stop-agent", post(handlers::stop_agent))
        // Chat relay
        .route("/chat-message", post(handlers::chat_message))
        .route("/test-webhook", post(handlers::test_webhook))
        .layer(cors_layer(frontend_origin))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if frontend_origin.is_empty() {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(frontend_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!("Invalid frontend origin {:?}: {}; allowing any", frontend_origin, e);
            layer.allow_origin(Any)
        }
    }
}
