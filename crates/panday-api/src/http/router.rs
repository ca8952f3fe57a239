//! Axum router configuration with middleware.
//!
//! JSON routes live under `/api/`; the relay endpoints (`/log`, `/debug`,
//! `/tools`) sit at the root where the browser client expects them.
//! Middleware: user id cookie issuance, page protection, CORS, tracing.
//!
//! When `PANDAY_WEB_DIR` (default `web/dist`) exists, the built frontend is
//! served from it. API routes take priority; unknown paths fall through to
//! `index.html` for client-side routing.

use axum::Router;
use axum::http::HeaderName;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::middleware::{issue_user_id, protect_pages};
use crate::state::AppState;

const WEB_DIR_VAR: &str = "PANDAY_WEB_DIR";
const DEFAULT_WEB_DIR: &str = "web/dist";

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-sources"),
            HeaderName::from_static("x-roadmap-id"),
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    let api_routes = Router::new()
        // Retrieval chat
        .route("/chat", post(handlers::chat::chat))
        // Chat threads
        .route(
            "/chat-threads",
            get(handlers::threads::list_threads).post(handlers::threads::create_thread),
        )
        .route(
            "/chat-threads/{thread_id}",
            get(handlers::threads::get_thread)
                .patch(handlers::threads::update_thread)
                .delete(handlers::threads::delete_thread),
        )
        .route(
            "/chat-threads/{thread_id}/messages",
            get(handlers::threads::list_messages).post(handlers::threads::append_messages),
        )
        // Node progress
        .route(
            "/node-progress",
            get(handlers::progress::get_progress).patch(handlers::progress::update_progress),
        )
        // FAQ
        .route("/faq", get(handlers::faq::list_faq))
        // Profile
        .route(
            "/profile",
            get(handlers::profile::get_profile)
                .post(handlers::profile::save_profile)
                .patch(handlers::profile::update_profile),
        )
        .route("/profile/tutorial", post(handlers::profile::complete_tutorial))
        .route("/profile/insights", get(handlers::profile::get_insights))
        // Roadmaps
        .route("/roadmaps", get(handlers::roadmap::list_roadmaps))
        .route("/roadmaps/{roadmap_id}", get(handlers::roadmap::get_roadmap))
        .route(
            "/roadmaps/{roadmap_id}/nodes/{node_id}",
            get(handlers::roadmap::get_node),
        )
        // Scheduled jobs
        .route(
            "/cron/refresh-roadmaps",
            get(handlers::cron::refresh_roadmaps),
        )
        // Dependencies
        .route("/status", get(handlers::status::get_status));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/log", post(handlers::relay::post_log))
        .route("/debug/{request_id}", get(handlers::relay::get_debug))
        .route("/tools/{request_id}", get(handlers::relay::stream_tools))
        .route("/health", get(health_check));

    let web_dir = std::env::var(WEB_DIR_VAR).unwrap_or_else(|_| DEFAULT_WEB_DIR.to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "frontend static file serving enabled");
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), protect_pages))
        .layer(middleware::from_fn(issue_user_id))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
