//! Chat threads, thread messages, retrieval sources, and chat constants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-wide chat widget configuration shared with the browser.
pub mod config {
    /// Minimum retrieval score for a source to be shown to the user.
    pub const RELEVANCE_THRESHOLD: f64 = 0.7;
    /// Distance from the bottom (px) within which the widget auto-scrolls.
    pub const SCROLL_THRESHOLD_PX: u32 = 100;
    /// Maximum number of messages kept in browser storage.
    pub const MAX_CACHED_MESSAGES: usize = 50;
    /// Maximum serialized size of cached messages (1 MiB).
    pub const MAX_STORAGE_SIZE_BYTES: usize = 1024 * 1024;
    /// Messages kept when the cache has to be trimmed below the size limit.
    pub const FALLBACK_MESSAGE_COUNT: usize = 10;
    /// Browser storage key for cached messages.
    pub const STORAGE_KEY: &str = "panday_chat_messages";
}

/// Title used when a thread is created without one.
pub const DEFAULT_THREAD_TITLE: &str = "New chat";

/// Role of a stored thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRole::User => write!(f, "user"),
            ThreadRole::Assistant => write!(f, "assistant"),
            ThreadRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for ThreadRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ThreadRole::User),
            "assistant" => Ok(ThreadRole::Assistant),
            "system" => Ok(ThreadRole::System),
            other => Err(format!("Unsupported role: '{other}'")),
        }
    }
}

/// A retrieved document fragment backing an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub node_id: String,
    pub title: String,
    pub score: f64,
    pub text_snippet: String,
}

/// A conversation thread owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub title: String,
    pub roadmap_id: Option<String>,
    pub selected_node_id: Option<String>,
    pub message_preview: Option<String>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub messages_count: u32,
}

/// A message stored in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub thread_id: Uuid,
    pub role: ThreadRole,
    pub content: String,
    /// Opaque JSON as supplied by the client (usually a list of sources).
    pub sources: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A message to append to a thread, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewThreadMessage {
    pub role: ThreadRole,
    pub content: String,
    pub sources: Option<serde_json::Value>,
}

/// Fields accepted when creating a thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewThread {
    pub roadmap_id: Option<String>,
    pub selected_node_id: Option<String>,
    pub title: Option<String>,
}

/// Partial thread update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub roadmap_id: Option<Option<String>>,
    pub selected_node_id: Option<Option<String>>,
}

/// Filters and paging for listing a user's threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadListQuery {
    pub limit: u32,
    pub cursor: Option<Uuid>,
    pub roadmap_id: Option<String>,
}

/// One page of threads, newest activity first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub threads: Vec<ChatThread>,
    pub next_cursor: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_rejects_unknown() {
        assert_eq!("assistant".parse::<ThreadRole>().unwrap(), ThreadRole::Assistant);
        assert!("tool".parse::<ThreadRole>().is_err());
    }

    #[test]
    fn thread_serialization_hides_owner() {
        let now = Utc::now();
        let thread = ChatThread {
            id: Uuid::now_v7(),
            user_id: "user_123".to_string(),
            title: DEFAULT_THREAD_TITLE.to_string(),
            roadmap_id: None,
            selected_node_id: Some("level-1".to_string()),
            message_preview: None,
            last_message_at: now,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            messages_count: 0,
        };
        let value = serde_json::to_value(&thread).unwrap();
        assert!(value.get("userId").is_none());
        assert!(value.get("deletedAt").is_none());
        assert_eq!(value["selectedNodeId"], "level-1");
        assert_eq!(value["roadmapId"], serde_json::Value::Null);
        assert_eq!(value["messagesCount"], 0);
    }

    #[test]
    fn chat_config_values() {
        assert_eq!(config::MAX_STORAGE_SIZE_BYTES, 1_048_576);
        assert_eq!(config::STORAGE_KEY, "panday_chat_messages");
        assert!(config::FALLBACK_MESSAGE_COUNT < config::MAX_CACHED_MESSAGES);
    }
}
