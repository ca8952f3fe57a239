use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Errors from repository operations (used by trait definitions in panday-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the shared key-value store (local Redis or the REST store).
#[derive(Debug, Error)]
pub enum KvError {
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),

    #[error("key-value command failed: {0}")]
    Command(String),

    #[error("unexpected key-value response: {0}")]
    Protocol(String),
}

/// Errors raised while consulting the rate limiter.
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit store error: {0}")]
    Store(#[from] KvError),

    #[error("invalid rate limit configuration: {0}")]
    Config(String),
}

/// Errors raised while loading roadmap data from disk.
///
/// Messages keep the roadmap (and node) ID alongside the underlying cause.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("Failed to load metadata for roadmap \"{roadmap_id}\": {cause}")]
    Metadata { roadmap_id: String, cause: String },

    #[error("Failed to load graph for roadmap \"{roadmap_id}\": {cause}")]
    Graph { roadmap_id: String, cause: String },

    #[error("Failed to load content for node \"{node_id}\" in roadmap \"{roadmap_id}\": {cause}")]
    NodeContent {
        roadmap_id: String,
        node_id: String,
        cause: String,
    },

    #[error("Failed to load node content for roadmap \"{roadmap_id}\": {cause}")]
    ContentDirectory { roadmap_id: String, cause: String },

    #[error("Failed to load available roadmaps: {0}")]
    Listing(String),

    #[error("invalid roadmap id: '{0}'")]
    InvalidId(String),
}

/// Errors related to user identity: cookie issuance and session verification.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("synchronous user id generation requires a browser context; use the async generator on the server")]
    NotInBrowserContext,

    #[error("missing session token")]
    MissingSession,

    #[error("invalid session token: {0}")]
    InvalidSession(String),

    #[error("session expired")]
    Expired,

    #[error("session verification is not configured")]
    NotConfigured,
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors from the embeddings (retrieval) service.
#[derive(Debug, Error)]
pub enum EmbeddingsError {
    #[error("Embeddings API query failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("embeddings request failed: {0}")]
    Transport(String),

    #[error("invalid embeddings response: {0}")]
    Decode(String),

    #[error("Health check failed ({0})")]
    Health(u16),
}

/// Errors from the retrieval chat pipeline.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required and must be a string")]
    InvalidMessage,

    #[error(transparent)]
    Retrieval(#[from] EmbeddingsError),

    #[error(transparent)]
    Model(#[from] crate::llm::LlmError),
}

/// Field-level validation problems, shaped like `{ formErrors, fieldErrors }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Errors from chat thread operations.
#[derive(Debug, Error)]
pub enum ThreadError {
    #[error("Thread not found")]
    NotFound,

    /// `message` is the client-facing summary ("Invalid payload", "Invalid query").
    #[error("{message}")]
    Invalid {
        message: &'static str,
        details: FieldErrors,
    },

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found")]
    NotFound,

    #[error("Invalid profile data")]
    Invalid(FieldErrors),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from node progress operations.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("roadmapId is required")]
    MissingRoadmapId,

    #[error("Invalid node progress data")]
    Invalid(FieldErrors),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_roadmap_error_carries_ids() {
        let err = RoadmapError::Metadata {
            roadmap_id: "electrician-bc".to_string(),
            cause: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load metadata for roadmap \"electrician-bc\": No such file or directory"
        );

        let err = RoadmapError::NodeContent {
            roadmap_id: "electrician-bc".to_string(),
            node_id: "level-1".to_string(),
            cause: "bad yaml".to_string(),
        };
        assert!(err.to_string().contains("\"level-1\""));
        assert!(err.to_string().contains("\"electrician-bc\""));
    }

    #[test]
    fn test_rate_limit_error_wraps_kv() {
        let err: RateLimitError = KvError::Unavailable("connection refused".to_string()).into();
        assert_eq!(
            err.to_string(),
            "rate limit store error: key-value store unavailable: connection refused"
        );
    }

    #[test]
    fn test_embeddings_status_message() {
        let err = EmbeddingsError::Status {
            status: 503,
            body: "index not loaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Embeddings API query failed (503): index not loaded"
        );
    }

    #[test]
    fn test_field_errors_shape() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.add("title", "String must contain at most 120 character(s)");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["formErrors"], serde_json::json!([]));
        assert_eq!(
            json["fieldErrors"]["title"][0],
            "String must contain at most 120 character(s)"
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_domain_not_found_messages() {
        assert_eq!(ThreadError::NotFound.to_string(), "Thread not found");
        assert_eq!(ProfileError::NotFound.to_string(), "Profile not found");
        assert_eq!(
            ProgressError::Invalid(FieldErrors::new()).to_string(),
            "Invalid node progress data"
        );
    }
}
