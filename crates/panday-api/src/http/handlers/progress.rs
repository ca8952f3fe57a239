//! Node progress handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};

use panday_core::service::progress::NodeProgressInput;
use panday_types::progress::{NodeProgress, NodeStatus};

use crate::http::error::{AppError, or_internal};
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::body::LenientJson;
use crate::http::extractors::query::ProgressQuery;
use crate::state::AppState;

/// GET /api/node-progress?roadmapId=
pub async fn get_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<BTreeMap<String, NodeStatus>>, AppError> {
    let map = state
        .progress_service
        .progress_map(user.user_id(), query.roadmap_id.as_deref())
        .await
        .map_err(or_internal("Failed to fetch node progress"))?;
    Ok(Json(map))
}

/// PATCH /api/node-progress
pub async fn update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    body: LenientJson,
) -> Result<Json<NodeProgress>, AppError> {
    let input: NodeProgressInput = body.decode("Invalid node progress data")?;
    let progress = state
        .progress_service
        .update(user.user_id(), input)
        .await
        .map_err(or_internal("Failed to update node progress"))?;
    Ok(Json(progress))
}
