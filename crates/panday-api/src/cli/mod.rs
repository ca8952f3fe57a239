//! CLI command definitions for the `panday` binary.
//!
//! Uses clap derive macros for argument parsing. Commands follow a
//! noun-verb pattern (e.g., `panday roadmap validate`, `panday ratelimit reset`).

pub mod ratelimit;
pub mod roadmap;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Backend for the Panday apprenticeship roadmap.
#[derive(Parser)]
#[command(name = "panday", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "PANDAY_OTEL")]
    pub otel: bool,

    /// Use the in-process key-value store instead of Redis/Upstash.
    #[arg(long, global = true)]
    pub memory_kv: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (overrides PANDAY_PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides PANDAY_HOST).
        #[arg(long)]
        host: Option<String>,
    },

    /// Environment summary and dependency checks.
    Status,

    /// Roadmap content tools.
    Roadmap {
        #[command(subcommand)]
        action: RoadmapCommand,
    },

    /// Chat rate limiter maintenance.
    Ratelimit {
        #[command(subcommand)]
        action: RatelimitCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RoadmapCommand {
    /// List roadmap IDs found in the roadmaps directory.
    #[command(alias = "ls")]
    List,

    /// Load a roadmap and check parents, connections and positions.
    Validate {
        /// Roadmap ID (directory name).
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RatelimitCommand {
    /// Forget an identifier's current and previous window.
    Reset {
        /// User ID, anonymous cookie value or client IP.
        identifier: String,
    },
}
