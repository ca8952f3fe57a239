//! Embeddings service port used to ground chat answers.

use panday_types::chat::SourceDocument;
use panday_types::error::EmbeddingsError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, roadmap_id: Option<String>, top_k: Option<u32>) -> Self {
        Self {
            query: query.into(),
            top_k: top_k.unwrap_or(DEFAULT_TOP_K),
            roadmap_id,
        }
    }
}

/// Relevant sources and the concatenated context for the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub roadmap_id: String,
    pub sources: Vec<SourceDocument>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingsHealth {
    pub status: String,
    #[serde(default)]
    pub loaded_indexes: Vec<String>,
}

/// Semantic search over roadmap content.
pub trait Retriever: Send + Sync {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl std::future::Future<Output = Result<QueryResponse, EmbeddingsError>> + Send;

    fn health(
        &self,
    ) -> impl std::future::Future<Output = Result<EmbeddingsHealth, EmbeddingsError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_defaults_to_five() {
        let req = QueryRequest::new("how do I start?", None, None);
        assert_eq!(req.top_k, 5);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("roadmap_id").is_none());

        let req = QueryRequest::new("q", Some("electrician-bc".to_string()), Some(3));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["top_k"], 3);
        assert_eq!(json["roadmap_id"], "electrician-bc");
    }

    #[test]
    fn health_tolerates_missing_indexes() {
        let health: EmbeddingsHealth = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(health.loaded_indexes.is_empty());
    }
}
