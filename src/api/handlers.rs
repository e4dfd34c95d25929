//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, warn};

use crate::{
    error::TimerError,
    state::{AppState, ConfigUpdate, TimerState},
};
use super::responses::{ErrorResponse, HealthResponse, StatusResponse, TimerResponse};

type ApiResult = Result<Json<TimerResponse>, (StatusCode, Json<ErrorResponse>)>;

fn respond(result: Result<TimerState, TimerError>, message: &str) -> ApiResult {
    match result {
        Ok(timer) => Ok(Json(TimerResponse::new(message, timer))),
        Err(e @ TimerError::ConfigLocked) => {
            warn!("Rejected request: {}", e);
            Err((StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string()))))
        }
        Err(e @ TimerError::ControllerUnavailable) => {
            error!("Request failed: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(state.start().await, "Timer started")
}

/// Handle POST /pause - Pause the countdown, keeping the remaining time
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(state.pause().await, "Timer paused")
}

/// Handle POST /toggle - Start/pause button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.toggle().await;
    let message = match &result {
        Ok(timer) if timer.is_running => "Timer started",
        _ => "Timer paused",
    };
    respond(result, message)
}

/// Handle POST /reset - Back to the first work phase
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(state.reset().await, "Timer reset")
}

/// Handle PUT /config - Change durations or cycle count while paused
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> ApiResult {
    respond(state.configure(update).await, "Configuration updated")
}

/// Handle GET /status - Return the current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.get_timer_state();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        status: timer.status().as_str().to_string(),
        display: timer.display(),
        timer,
        relay: state.relay.clone(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
