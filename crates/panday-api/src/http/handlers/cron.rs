//! Scheduled jobs, guarded by the `CRON_SECRET` bearer token.

use axum::Json;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use serde_json::json;

use panday_core::identity::cron::verify_cron_request;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/cron/refresh-roadmaps: rebuild every cached roadmap.
pub async fn refresh_roadmaps(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let secret = state.config.cron_secret.as_ref().map(|s| s.expose_secret());
    if let Some(denial) = verify_cron_request(secret, authorization) {
        let status =
            StatusCode::from_u16(denial.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Ok((status, Json(json!({ "error": denial.message() }))).into_response());
    }

    let report = state.roadmaps.refresh_all().await?;
    Ok(Json(json!({ "success": true, "refreshed": report.refreshed, "failed": report.failed }))
        .into_response())
}
