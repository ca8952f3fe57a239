//! Roadmap read handlers, served from the roadmap cache.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use panday_core::roadmap::RoadmapSource;
use panday_types::roadmap::NodeContent;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/roadmaps
pub async fn list_roadmaps(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let ids = state.roadmaps.source().available_roadmaps().await?;
    Ok(Json(json!({ "roadmaps": ids })))
}

/// GET /api/roadmaps/{roadmap_id}
pub async fn get_roadmap(
    State(state): State<AppState>,
    Path(roadmap_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let roadmap = state.roadmaps.get(&roadmap_id).await?;
    let body =
        serde_json::to_value(roadmap.as_ref()).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(body))
}

/// GET /api/roadmaps/{roadmap_id}/nodes/{node_id}
pub async fn get_node(
    State(state): State<AppState>,
    Path((roadmap_id, node_id)): Path<(String, String)>,
) -> Result<Json<NodeContent>, AppError> {
    let roadmap = state.roadmaps.get(&roadmap_id).await?;
    roadmap
        .content
        .get(&node_id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound("Node not found"))
}
