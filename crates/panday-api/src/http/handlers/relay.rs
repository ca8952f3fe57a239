//! Debug and log relay for the browser.
//!
//! - `POST /log` re-emits a browser log line through tracing.
//! - `GET /debug/{request_id}` returns the stored debug record.
//! - `GET /tools/{request_id}` streams tool events as SSE.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde_json::{Value, json};
use tokio_stream::Stream;

use panday_core::relay::relay_client_log;
use panday_types::relay::{ClientLogEntry, DebugRecord, ToolEvent};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /log
pub async fn post_log(body: Bytes) -> Result<Json<Value>, AppError> {
    let entry: ClientLogEntry = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "malformed client log entry");
        AppError::Internal(e.to_string())
    })?;
    relay_client_log(&entry);
    Ok(Json(json!({ "success": true })))
}

/// GET /debug/{request_id}
pub async fn get_debug(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<DebugRecord>, AppError> {
    state
        .debug_store
        .get(&request_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Debug data not found"))
}

/// SSE event for a tool event; the payload omits the `type` tag.
fn tool_event(event: &ToolEvent) -> Event {
    let mut payload = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
    if let Some(map) = payload.as_object_mut() {
        map.remove("type");
    }
    Event::default()
        .event(event.event_name())
        .data(payload.to_string())
}

/// GET /tools/{request_id}
///
/// Replays what has already happened for the request, then follows live
/// events until `done`.
pub async fn stream_tools(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(request_id = %request_id, "tool event subscriber connected");
    let events = state
        .tool_events
        .stream(&request_id)
        .map(|event| Ok::<_, Infallible>(tool_event(&event)));
    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
