//! SSE streaming chat endpoint.
//!
//! POST /api/chat
//!
//! Rate-limits the caller, retrieves roadmap context and streams the model's
//! answer as Server-Sent Events.
//!
//! SSE event types:
//! - `request`: initial event with `{ "requestId": "..." }`
//! - `text_delta`: incremental text: `{ "text": "..." }`
//! - `usage`: token usage: `{ "inputTokens": N, "outputTokens": N }`
//! - `done`: stream complete: `{}`
//! - `error`: error occurred: `{ "message": "..." }`

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde_json::json;
use tracing::Instrument;

use panday_core::chat::{ChatRequest, PreparedAnswer};
use panday_core::ratelimit::RateLimitDecision;
use panday_core::status::api_key_var;
use panday_types::llm::StreamEvent;

use crate::http::error::AppError;
use crate::http::extractors::auth::ClientIdentity;
use crate::http::extractors::body::LenientJson;
use crate::state::AppState;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
static X_SOURCES: HeaderName = HeaderName::from_static("x-sources");
static X_ROADMAP_ID: HeaderName = HeaderName::from_static("x-roadmap-id");

fn rate_limit_headers(decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_ms.to_string()),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}

fn rate_limited(decision: &RateLimitDecision) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        rate_limit_headers(decision),
        Json(json!({ "error": "Rate limit exceeded" })),
    )
        .into_response()
}

/// POST /api/chat: SSE streaming answer grounded in roadmap content.
pub async fn chat(
    State(state): State<AppState>,
    ClientIdentity(identifier): ClientIdentity,
    body: LenientJson,
) -> Result<Response, AppError> {
    let decision = state.rate_limiter.limit(&identifier).await?;
    if !decision.success {
        tracing::warn!(identifier = %identifier, reset_ms = decision.reset_ms, "chat rate limit exceeded");
        return Ok(rate_limited(&decision));
    }

    let request = ChatRequest::from_json(&body.0)?;
    let answers = state.answers.clone().ok_or_else(|| {
        AppError::Internal(format!(
            "{} is not configured",
            api_key_var(state.config.ai_provider)
        ))
    })?;

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "chat",
        request_id = %request_id,
        gen_ai.provider.name = %answers.model().name(),
        gen_ai.request.model = %answers.model().model(),
    );
    span.in_scope(|| {
        tracing::info!(roadmap_id = ?request.roadmap_id, top_k = ?request.top_k, "chat request");
    });

    let prepared = answers
        .answer(&request_id, request)
        .instrument(span)
        .await?;
    let sources = serde_json::to_string(&prepared.sources)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut headers = rate_limit_headers(&decision);
    for (name, value) in [
        (&X_REQUEST_ID, prepared.request_id.as_str()),
        (&X_SOURCES, sources.as_str()),
        (&X_ROADMAP_ID, prepared.roadmap_id.as_str()),
    ] {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name.clone(), value);
            }
            Err(e) => tracing::warn!(header = %name, error = %e, "response header dropped"),
        }
    }

    let sse = Sse::new(answer_events(prepared))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));
    Ok((headers, sse).into_response())
}

/// Translate model events into the SSE protocol above.
fn answer_events(
    prepared: PreparedAnswer,
) -> impl tokio_stream::Stream<Item = Result<Event, Infallible>> {
    let PreparedAnswer {
        request_id,
        mut events,
        ..
    } = prepared;

    async_stream::stream! {
        let data = json!({ "requestId": request_id });
        yield Ok::<_, Infallible>(Event::default().event("request").data(data.to_string()));

        // Drained to the end: the debug record is written after the last item.
        let mut failed = false;
        while let Some(item) = events.next().await {
            match item {
                Ok(StreamEvent::TextDelta { text }) => {
                    let data = json!({ "text": text });
                    yield Ok(Event::default().event("text_delta").data(data.to_string()));
                }
                Ok(StreamEvent::Usage(usage)) => {
                    let data = serde_json::to_string(&usage).unwrap_or_default();
                    yield Ok(Event::default().event("usage").data(data));
                }
                Ok(_) => {}
                Err(e) => {
                    let data = json!({ "message": e.to_string() });
                    yield Ok(Event::default().event("error").data(data.to_string()));
                    failed = true;
                }
            }
        }

        if !failed {
            yield Ok(Event::default().event("done").data("{}"));
        }
    }
}
