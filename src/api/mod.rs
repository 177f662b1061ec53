//! HTTP API module
//!
//! Status and control endpoints for whatever hosts the menu UI.

pub mod handlers;
pub mod responses;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::tasks::OrchestratorHandle;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(handle: OrchestratorHandle) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/snooze", post(snooze_handler))
        .route("/next", post(next_handler))
        .route("/lock", post(lock_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(handle)
}
