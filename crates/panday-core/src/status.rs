//! Dependency checks behind `GET /api/status` and `panday status`.

use std::time::Instant;

use panday_types::config::{AiProvider, KvProvider};
use panday_types::error::RepositoryError;
use panday_types::status::{ServiceState, ServiceStatus};

use crate::retrieval::Retriever;
use crate::storage::kv_store::KeyValueStore;

/// Something that can answer a trivial query (`SELECT 1`).
pub trait DatabasePing: Send + Sync {
    fn ping(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

fn service(name: &str, state: ServiceState, detail: impl Into<String>) -> ServiceStatus {
    ServiceStatus {
        name: name.to_string(),
        state,
        detail: detail.into(),
        latency_ms: None,
        target: None,
        error: None,
    }
}

pub async fn check_database<D: DatabasePing>(db: &D, target: &str, location: &str) -> ServiceStatus {
    let start = Instant::now();
    match db.ping().await {
        Ok(()) => ServiceStatus {
            latency_ms: Some(start.elapsed().as_millis() as u64),
            target: Some(target.to_string()),
            ..service(
                "Database",
                ServiceState::Ok,
                format!("Connected to {target} database at {location}"),
            )
        },
        Err(e) => {
            tracing::error!(mode = target, error = %e, "database health check failed");
            ServiceStatus {
                target: Some(target.to_string()),
                error: Some(e.to_string()),
                ..service("Database", ServiceState::Error, "Database connection failed")
            }
        }
    }
}

pub async fn check_kv<S: KeyValueStore>(kv: &S, provider: KvProvider) -> ServiceStatus {
    let start = Instant::now();
    match kv.ping().await {
        Ok(reply) => ServiceStatus {
            latency_ms: Some(start.elapsed().as_millis() as u64),
            target: Some(provider.to_string()),
            ..service(
                "Redis",
                ServiceState::Ok,
                format!("{provider} responded with {reply}"),
            )
        },
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "key-value health check failed");
            ServiceStatus {
                target: Some(provider.to_string()),
                error: Some(e.to_string()),
                ..service("Redis", ServiceState::Error, format!("{provider} ping failed"))
            }
        }
    }
}

pub fn check_identity(configured: bool) -> ServiceStatus {
    if configured {
        service("Clerk", ServiceState::Ok, "Clerk keys loaded")
    } else {
        service(
            "Clerk",
            ServiceState::Warn,
            "Clerk environment variables missing",
        )
    }
}

/// Environment variable holding the API key for `provider`.
pub fn api_key_var(provider: AiProvider) -> &'static str {
    match provider {
        AiProvider::OpenAi => "OPENAI_API_KEY",
        AiProvider::Google => "GOOGLE_API_KEY",
    }
}

pub fn check_model(provider: AiProvider, key_configured: bool) -> ServiceStatus {
    let var = api_key_var(provider);
    let status = if key_configured {
        service("AI Provider", ServiceState::Ok, format!("{var} configured"))
    } else {
        service("AI Provider", ServiceState::Error, format!("{var} missing"))
    };
    ServiceStatus {
        target: Some(provider.to_string()),
        ..status
    }
}

/// The embeddings service is optional for most pages, so failures warn.
pub async fn check_embeddings<R: Retriever>(retriever: &R, url: &str) -> ServiceStatus {
    let start = Instant::now();
    match retriever.health().await {
        Ok(health) => ServiceStatus {
            latency_ms: Some(start.elapsed().as_millis() as u64),
            target: Some(url.to_string()),
            ..service(
                "Embeddings API",
                ServiceState::Ok,
                format!(
                    "{} ({} indexes loaded)",
                    health.status,
                    health.loaded_indexes.len()
                ),
            )
        },
        Err(e) => ServiceStatus {
            target: Some(url.to_string()),
            error: Some(e.to_string()),
            ..service("Embeddings API", ServiceState::Warn, "Embeddings API unreachable")
        },
    }
}
