//! Apprentice profile handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use panday_core::profile::ProfileInsights;
use panday_types::profile::{ProfileInput, ProfileUpdate, UserProfile};

use crate::http::error::{AppError, or_internal};
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::body::LenientJson;
use crate::state::AppState;

const INVALID_PROFILE: &str = "Invalid profile data";

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .profile_service
        .get(user.user_id())
        .await
        .map_err(or_internal("Failed to fetch profile"))?;
    Ok(Json(profile))
}

/// POST /api/profile: store onboarding answers (upsert).
pub async fn save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    body: LenientJson,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let input: ProfileInput = body.decode(INVALID_PROFILE).inspect_err(|e| {
        tracing::warn!(error = %e, "profile validation failed");
    })?;
    let profile = state
        .profile_service
        .save_onboarding(user.user_id(), input)
        .await
        .map_err(or_internal("Failed to create profile"))?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    body: LenientJson,
) -> Result<Json<UserProfile>, AppError> {
    let update: ProfileUpdate = body.decode(INVALID_PROFILE)?;
    let profile = state
        .profile_service
        .update(user.user_id(), update)
        .await
        .map_err(or_internal("Failed to update profile"))?;
    Ok(Json(profile))
}

/// POST /api/profile/tutorial
pub async fn complete_tutorial(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let profile = state
        .profile_service
        .complete_tutorial(user.user_id())
        .await
        .map_err(or_internal("Failed to update tutorial status"))?;
    Ok(Json(json!({ "success": true, "profile": profile })))
}

/// GET /api/profile/insights: roadmap personalization for the stored profile.
pub async fn get_insights(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileInsights>, AppError> {
    let profile = state
        .profile_service
        .get(user.user_id())
        .await
        .map_err(or_internal("Failed to fetch profile"))?;
    Ok(Json(ProfileInsights::for_profile(&profile)))
}
