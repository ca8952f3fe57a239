//! Panday CLI and HTTP server entry point.
//!
//! Binary name: `panday`
//!
//! Parses CLI arguments, loads configuration from the environment, then
//! dispatches to a command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, RatelimitCommand, RoadmapCommand};
use panday_infra::config::AppConfig;
use panday_observe::{LogFormat, init_tracing, shutdown_tracing};
use state::AppState;

/// How often idle tool-event channels are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);
/// Channels older than this are dropped, subscribed or not.
const TOOL_EVENT_RETENTION: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need configuration or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "panday", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(LogFormat::from_env(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let result = run(cli, config).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, host } => serve(config, cli.memory_kv, host, port).await?,

        Commands::Status => {
            let state = AppState::init(config, cli.memory_kv).await?;
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Roadmap { action } => match action {
            RoadmapCommand::List => cli::roadmap::list(&config, cli.json).await?,
            RoadmapCommand::Validate { id } => {
                cli::roadmap::validate(&config, &id, cli.json).await?
            }
        },

        Commands::Ratelimit { action } => match action {
            RatelimitCommand::Reset { identifier } => {
                cli::ratelimit::reset(&config, cli.memory_kv, &identifier, cli.json).await?
            }
        },

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

async fn serve(
    mut config: AppConfig,
    memory_kv: bool,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate().context("invalid configuration")?;

    let addr = config.bind_address();
    let state = AppState::init(config, memory_kv).await?;

    let hub = state.tool_events.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let pruned = hub.prune_older_than(TOOL_EVENT_RETENTION);
            if pruned > 0 {
                tracing::debug!(pruned, "tool event channels pruned");
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!(
        "  {} Panday listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());
    tracing::info!(%addr, "server started");

    let router = http::router::build_router(state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
