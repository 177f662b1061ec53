//! HTTP endpoint handlers

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info};

use super::responses::{ApiResponse, HealthResponse};
use crate::{error::LoopClosed, state::StatusSnapshot, tasks::OrchestratorHandle};

/// Send an action to the orchestrator and report the status that follows it
async fn dispatch(
    handle: &OrchestratorHandle,
    action: &'static str,
    message: &str,
    send: fn(&OrchestratorHandle) -> Result<(), LoopClosed>,
) -> Result<Json<ApiResponse>, StatusCode> {
    info!("{} endpoint called", action);
    let session = match send(handle) {
        Ok(()) => handle.status().await,
        Err(e) => Err(e),
    };
    match session {
        Ok(session) => Ok(Json(ApiResponse::new(action, message, session))),
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /start - Start the work timer
pub async fn start_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch(&handle, "start", "Work cycle start requested", OrchestratorHandle::start).await
}

/// Handle POST /stop - Stop the cycle and take down any curtain
pub async fn stop_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch(&handle, "stop", "Cycle stopped", OrchestratorHandle::stop).await
}

/// Handle POST /snooze - Snooze the current break
pub async fn snooze_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch(&handle, "snooze", "Snooze requested", OrchestratorHandle::snooze).await
}

/// Handle POST /next - Skip the rest of the break
pub async fn next_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch(&handle, "next", "Skip requested", OrchestratorHandle::next).await
}

/// Handle POST /lock - Lock the session from the curtain
pub async fn lock_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<ApiResponse>, StatusCode> {
    dispatch(&handle, "lock", "Session lock requested", OrchestratorHandle::lock).await
}

/// Handle GET /status - Return current session status
pub async fn status_handler(
    State(handle): State<OrchestratorHandle>,
) -> Result<Json<StatusSnapshot>, StatusCode> {
    match handle.status().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to get session status: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
