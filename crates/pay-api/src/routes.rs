//! # Routes
//!
//! Axum router configuration for the STK push server.

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /status   - Liveness text
/// - GET  /health   - JSON health check
/// - POST /stkpush  - Start an STK push
/// - POST /callback - Daraja result callback (no body size limit)
/// - GET  /         - Payment form page
///
/// Anything else is looked up in the static directory (WASM bundle, assets).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.static_dir.clone();
    let index = ServeFile::new(state.config.index_file());

    Router::new()
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .route("/stkpush", post(handlers::stk_push))
        .route(
            "/callback",
            post(handlers::callback).layer(DefaultBodyLimit::disable()),
        )
        .route_service("/", index)
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
