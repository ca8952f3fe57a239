//! System status endpoint.

use axum::Json;
use axum::extract::State;

use panday_types::status::SystemStatus;

use crate::state::AppState;

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(state.system_status().await)
}
