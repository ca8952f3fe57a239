//! Chat thread handlers for the REST API.
//!
//! Every route requires a session; threads of other users read as missing.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use panday_core::chat::MessageInput;
use panday_types::chat::{NewThread, ThreadPatch};

use crate::http::error::{AppError, or_internal};
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::body::{LenientJson, nullable};
use crate::http::extractors::query::{MessageListQuery, ThreadListQuery, parse_limit};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThreadBody {
    #[serde(default)]
    roadmap_id: Option<String>,
    #[serde(default)]
    selected_node_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateThreadBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    roadmap_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    selected_node_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct AppendMessagesBody {
    #[serde(default)]
    messages: Vec<MessageInput>,
}

fn thread_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request("Invalid thread id"))
}

/// GET /api/chat-threads
pub async fn list_threads(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ThreadListQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = parse_limit(query.limit.as_deref(), "Invalid query")?;
    let page = state
        .thread_service
        .list_threads(
            user.user_id(),
            limit,
            query.cursor.as_deref(),
            query.roadmap_id.as_deref(),
        )
        .await
        .map_err(or_internal("Failed to fetch threads"))?;
    Ok(Json(json!(page)))
}

/// POST /api/chat-threads
pub async fn create_thread(
    State(state): State<AppState>,
    user: AuthUser,
    body: LenientJson,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let body: CreateThreadBody = body.decode("Invalid payload")?;
    let thread = state
        .thread_service
        .create_thread(
            user.user_id(),
            NewThread {
                roadmap_id: body.roadmap_id,
                selected_node_id: body.selected_node_id,
                title: body.title,
            },
        )
        .await
        .map_err(or_internal("Failed to create thread"))?;
    Ok((StatusCode::CREATED, Json(json!({ "thread": thread }))))
}

/// GET /api/chat-threads/{thread_id}
pub async fn get_thread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = thread_id(&raw_id)?;
    let thread = state
        .thread_service
        .get_thread(user.user_id(), &id)
        .await
        .map_err(or_internal("Failed to fetch thread"))?;
    Ok(Json(json!({ "thread": thread })))
}

/// PATCH /api/chat-threads/{thread_id}
pub async fn update_thread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
    body: LenientJson,
) -> Result<Json<Value>, AppError> {
    let id = thread_id(&raw_id)?;
    let body: UpdateThreadBody = body.decode("Invalid payload")?;
    let thread = state
        .thread_service
        .update_thread(
            user.user_id(),
            &id,
            ThreadPatch {
                title: body.title,
                roadmap_id: body.roadmap_id,
                selected_node_id: body.selected_node_id,
            },
        )
        .await
        .map_err(or_internal("Failed to update thread"))?;
    Ok(Json(json!({ "thread": thread })))
}

/// DELETE /api/chat-threads/{thread_id}
pub async fn delete_thread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = thread_id(&raw_id)?;
    state
        .thread_service
        .delete_thread(user.user_id(), &id)
        .await
        .map_err(or_internal("Failed to delete thread"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/chat-threads/{thread_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Value>, AppError> {
    let id = thread_id(&raw_id)?;
    let limit = parse_limit(query.limit.as_deref(), "Invalid limit")?;
    let messages = state
        .thread_service
        .list_messages(user.user_id(), &id, limit)
        .await
        .map_err(or_internal("Failed to fetch messages"))?;
    Ok(Json(json!({ "messages": messages })))
}

/// POST /api/chat-threads/{thread_id}/messages
pub async fn append_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
    body: LenientJson,
) -> Result<Json<Value>, AppError> {
    let id = thread_id(&raw_id)?;
    let body: AppendMessagesBody = body.decode("Invalid payload")?;
    let messages = state
        .thread_service
        .append_messages(user.user_id(), &id, body.messages)
        .await
        .map_err(or_internal("Failed to append messages"))?;
    Ok(Json(json!({ "messages": messages })))
}
