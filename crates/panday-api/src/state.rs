//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/source/store traits; AppState pins
//! them to the concrete infra implementations.

use std::sync::Arc;

use anyhow::Context;

use panday_core::chat::{AnswerService, ThreadService};
use panday_core::event::ToolEventHub;
use panday_core::identity::session::SessionVerifier;
use panday_core::llm::ChatModel;
use panday_core::ratelimit::{RateLimitConfig, RateLimiter};
use panday_core::relay::DebugStore;
use panday_core::roadmap::RoadmapCache;
use panday_core::service::{FaqService, NodeProgressService, ProfileService};
use panday_core::status::{check_database, check_embeddings, check_identity, check_kv, check_model};
use panday_infra::auth::session_verifier;
use panday_infra::config::AppConfig;
use panday_infra::embeddings::EmbeddingsClient;
use panday_infra::filesystem::LocalRoadmapSource;
use panday_infra::kv::{self, KvClient};
use panday_infra::llm::create_chat_model;
use panday_infra::sqlite::pool::database_location;
use panday_infra::sqlite::{
    DatabasePool, SqliteFaqRepository, SqliteNodeProgressRepository, SqliteProfileRepository,
    SqliteThreadRepository,
};
use panday_types::status::{EnvironmentStatus, SystemStatus};

/// Live events buffered per request channel.
const TOOL_EVENT_CAPACITY: usize = 64;

pub type ConcreteThreadService = ThreadService<SqliteThreadRepository>;
pub type ConcreteProfileService = ProfileService<SqliteProfileRepository>;
pub type ConcreteProgressService = NodeProgressService<SqliteNodeProgressRepository>;
pub type ConcreteFaqService = FaqService<SqliteFaqRepository>;
pub type ConcreteAnswerService = AnswerService<EmbeddingsClient, KvClient>;
pub type ConcreteRoadmapCache = RoadmapCache<LocalRoadmapSource>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: DatabasePool,
    pub kv: Arc<KvClient>,
    pub rate_limiter: Arc<RateLimiter<KvClient>>,
    pub thread_service: Arc<ConcreteThreadService>,
    pub profile_service: Arc<ConcreteProfileService>,
    pub progress_service: Arc<ConcreteProgressService>,
    pub faq_service: Arc<ConcreteFaqService>,
    pub roadmaps: Arc<ConcreteRoadmapCache>,
    pub tool_events: ToolEventHub,
    pub debug_store: DebugStore<KvClient>,
    pub retriever: Arc<EmbeddingsClient>,
    /// `None` when no API key is configured for the selected provider.
    pub answers: Option<Arc<ConcreteAnswerService>>,
    pub sessions: Arc<dyn SessionVerifier>,
}

impl AppState {
    /// Connect to the database and key-value store, then wire services.
    ///
    /// `memory_kv` swaps the key-value store for the in-process one.
    pub async fn init(config: AppConfig, memory_kv: bool) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database_url)
            .await
            .with_context(|| {
                format!(
                    "failed to open database at {}",
                    database_location(&config.database_url)
                )
            })?;

        let kv = kv::connect(&config, memory_kv)
            .await
            .context("failed to connect to the key-value store (try --memory-kv)")?;

        let model = match create_chat_model(
            config.ai_provider,
            config.model_api_key(),
            &config.ai_model,
        ) {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::warn!(provider = %config.ai_provider, error = %e, "chat model unavailable");
                None
            }
        };

        Self::assemble(config, db_pool, kv, model)
    }

    /// Wire services around already-open connections.
    pub fn assemble(
        config: AppConfig,
        db_pool: DatabasePool,
        kv: KvClient,
        model: Option<Arc<dyn ChatModel>>,
    ) -> anyhow::Result<Self> {
        let kv = Arc::new(kv);
        let rate_limiter = RateLimiter::new(kv.clone(), RateLimitConfig::chat(config.production))
            .context("invalid rate limit configuration")?;
        let sessions =
            session_verifier(&config.clerk).context("invalid identity provider configuration")?;
        let retriever = Arc::new(
            EmbeddingsClient::new(&config.embeddings_api_url)
                .context("failed to build embeddings client")?,
        );

        let tool_events = ToolEventHub::new(TOOL_EVENT_CAPACITY);
        let debug_store = DebugStore::new(kv.clone());
        let answers = model.map(|model| {
            Arc::new(AnswerService::new(
                retriever.clone(),
                model,
                tool_events.clone(),
                debug_store.clone(),
            ))
        });

        let roadmaps = RoadmapCache::new(LocalRoadmapSource::new(config.roadmaps_dir.clone()));

        Ok(Self {
            thread_service: Arc::new(ThreadService::new(SqliteThreadRepository::new(
                db_pool.clone(),
            ))),
            profile_service: Arc::new(ProfileService::new(SqliteProfileRepository::new(
                db_pool.clone(),
            ))),
            progress_service: Arc::new(NodeProgressService::new(
                SqliteNodeProgressRepository::new(db_pool.clone()),
            )),
            faq_service: Arc::new(FaqService::new(SqliteFaqRepository::new(db_pool.clone()))),
            roadmaps: Arc::new(roadmaps),
            rate_limiter: Arc::new(rate_limiter),
            config: Arc::new(config),
            db_pool,
            kv,
            tool_events,
            debug_store,
            retriever,
            answers,
            sessions,
        })
    }

    /// Environment summary plus one check per dependency.
    pub async fn system_status(&self) -> SystemStatus {
        let config = &self.config;
        let location = database_location(&config.database_url);
        let target = config.deployment_target();
        let provider = self.kv.provider();

        let (database, kv, embeddings) = tokio::join!(
            check_database(&self.db_pool, target, location),
            check_kv(self.kv.as_ref(), provider),
            check_embeddings(self.retriever.as_ref(), self.retriever.base_url()),
        );

        SystemStatus {
            environment: EnvironmentStatus {
                deployment_target: target.to_string(),
                database: location.to_string(),
                kv_provider: provider.to_string(),
            },
            services: vec![
                database,
                kv,
                check_identity(config.clerk.keys_loaded()),
                check_model(config.ai_provider, config.model_api_key().is_some()),
                embeddings,
            ],
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::test_state;
    use panday_types::status::ServiceState;

    #[tokio::test]
    async fn status_reports_each_dependency() {
        let state = test_state(&[]).await;
        let status = state.system_status().await;

        assert_eq!(status.environment.deployment_target, "development");
        assert_eq!(status.environment.kv_provider, "Local Redis");
        let names: Vec<&str> = status.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Database", "Redis", "Clerk", "AI Provider", "Embeddings API"]
        );
        assert_eq!(status.services[0].state, ServiceState::Ok);
        assert_eq!(status.services[1].state, ServiceState::Ok);
        assert_eq!(status.services[2].state, ServiceState::Warn);
        assert_eq!(status.services[3].state, ServiceState::Ok);
        assert_eq!(status.services[4].state, ServiceState::Warn);
        assert_eq!(status.overall(), ServiceState::Warn);
    }

    #[tokio::test]
    async fn missing_model_key_is_an_error() {
        let state = test_state(&[("AI_PROVIDER", "openai")]).await;
        let status = state.system_status().await;
        let model = status
            .services
            .iter()
            .find(|s| s.name == "AI Provider")
            .unwrap();
        assert_eq!(model.state, ServiceState::Error);
        assert_eq!(model.detail, "OPENAI_API_KEY missing");
    }
}
