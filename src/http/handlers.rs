use super::state::AppState;
use crate::session::Snapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// started, stopping, already_active, unsupported, failed or not_active
    pub outcome: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    pub state: Snapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /state
/// Current status and result of the voice session
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.session.snapshot()))
}

/// POST /toggle
/// Start listening, or stop if already listening
pub async fn toggle(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.toggle().await {
        Ok(outcome) => {
            info!("Toggle via HTTP: {}", outcome.as_str());
            (
                StatusCode::OK,
                Json(ToggleResponse {
                    outcome: outcome.as_str().to_string(),
                    detail: outcome.detail().map(str::to_string),
                    state: state.session.snapshot(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Toggle failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
