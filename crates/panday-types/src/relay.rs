//! Debug/log relay payloads: tool-execution events, per-request debug
//! records, and log entries posted by the browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::SourceDocument;

/// A tool-execution event for one chat request, streamed over SSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolEvent {
    ToolStart {
        tool: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool: String,
        output: serde_json::Value,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    ToolError {
        tool: String,
        message: String,
    },
    /// Terminal event; no further events follow for the request.
    Done,
}

impl ToolEvent {
    /// SSE event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            ToolEvent::ToolStart { .. } => "tool_start",
            ToolEvent::ToolResult { .. } => "tool_result",
            ToolEvent::ToolError { .. } => "tool_error",
            ToolEvent::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolEvent::Done)
    }
}

/// Phase timings captured while serving a chat request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTimings {
    pub retrieval_ms: Option<u64>,
    pub first_token_ms: Option<u64>,
    pub total_ms: Option<u64>,
}

/// Token usage reported by the model provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything recorded about one chat request, served at `GET /debug/{request_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRecord {
    pub request_id: String,
    pub created_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub roadmap_id: Option<String>,
    pub sources: Vec<SourceDocument>,
    pub timings: RequestTimings,
    pub usage: Option<TokenUsage>,
    pub error: Option<String>,
}

/// A log line posted by the browser to `POST /log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLogEntry {
    pub level: String,
    pub component: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
