//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/search", get(handlers::search))
        .route("/fetch", get(handlers::fetch))
        .route("/debug", get(handlers::debug))
        .route("/health", get(handlers::health))
        // Static routes
        .route("/favicon.ico", get(handlers::favicon))
        .route("/favicon.png", get(handlers::favicon))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}
