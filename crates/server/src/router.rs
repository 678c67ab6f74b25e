use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the router for the direct pipeline server.
pub fn direct_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::general::direct_root))
        .route("/health", get(handlers::general::direct_health))
        .route("/ask", post(handlers::direct::ask))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

/// Creates the router for the data-agent server.
pub fn agent_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::general::agent_root))
        .route("/health", get(handlers::general::agent_health))
        .route("/ask", post(handlers::agent::ask))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
