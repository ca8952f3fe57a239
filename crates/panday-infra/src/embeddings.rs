//! HTTP client for the embeddings search service.
//!
//! `POST {base}/query` returns matching roadmap passages; `GET {base}/health`
//! reports which indexes are loaded.

use std::time::Duration;

use panday_core::retrieval::{EmbeddingsHealth, QueryRequest, QueryResponse, Retriever};
use panday_types::error::EmbeddingsError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    client: reqwest::Client,
    base_url: String,
}

impl EmbeddingsClient {
    pub fn new(base_url: &str) -> Result<Self, EmbeddingsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbeddingsError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Retriever for EmbeddingsClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, EmbeddingsError> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "embeddings query rejected");
            return Err(EmbeddingsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingsError::Decode(e.to_string()))?;
        tracing::debug!(
            roadmap_id = %parsed.roadmap_id,
            sources = parsed.sources.len(),
            "embeddings query complete"
        );
        Ok(parsed)
    }

    async fn health(&self) -> Result<EmbeddingsHealth, EmbeddingsError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| EmbeddingsError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EmbeddingsError::Health(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| EmbeddingsError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn query_posts_request_and_decodes_sources() {
        let router = axum::Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "query": body["query"],
                    "roadmap_id": body["roadmap_id"],
                    "sources": [{
                        "node_id": "level-1",
                        "title": "Level 1",
                        "score": 0.82,
                        "text_snippet": "Complete 1500 hours",
                    }],
                    "context": format!("top_k={}", body["top_k"]),
                }))
            }),
        );
        let client = EmbeddingsClient::new(&serve(router).await).unwrap();
        assert!(!client.base_url().ends_with('/'));

        let request = QueryRequest::new("hours?", Some("electrician-bc".to_string()), None);
        let response = client.query(&request).await.unwrap();
        assert_eq!(response.roadmap_id, "electrician-bc");
        assert_eq!(response.sources[0].node_id, "level-1");
        assert_eq!(response.context, "top_k=5");
    }

    #[tokio::test]
    async fn query_error_carries_status_and_body() {
        let router = axum::Router::new().route(
            "/query",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "index not loaded") }),
        );
        let client = EmbeddingsClient::new(&serve(router).await).unwrap();
        let err = client
            .query(&QueryRequest::new("q", None, None))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Embeddings API query failed (503): index not loaded"
        );
    }

    #[tokio::test]
    async fn health_reports_indexes_or_status() {
        let router = axum::Router::new().route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "loaded_indexes": ["electrician-bc"]})) }),
        );
        let client = EmbeddingsClient::new(&serve(router).await).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.loaded_indexes, vec!["electrician-bc"]);

        let router = axum::Router::new()
            .route("/health", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let client = EmbeddingsClient::new(&serve(router).await).unwrap();
        assert_eq!(
            client.health().await.unwrap_err().to_string(),
            "Health check failed (500)"
        );
    }
}
