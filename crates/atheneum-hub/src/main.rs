//! Atheneum Hub - directory and coordination hub for library nodes.
//!
//! This is the main entry point for running a hub. The `serve` command
//! starts the HTTP API; `mcp-server` runs the stdio MCP bridge that
//! exposes directory search to AI assistants.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use atheneum_hub::api::{create_router, AppState};
use atheneum_hub::config::HubConfig;
use atheneum_hub::fixtures;
use atheneum_hub::mcp::{HttpSearch, McpSession};
use atheneum_hub::observability::{init_logging, init_stderr_logging, LogFormat};

/// Atheneum Hub - directory and coordination hub for library nodes
#[derive(Parser, Debug)]
#[command(name = "atheneum-hub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hub.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the hub HTTP API (default)
    Serve {
        /// Listen address, overrides the config file
        #[arg(long)]
        listen_addr: Option<SocketAddr>,

        /// Log level (trace, debug, info, warn, error), overrides the config file
        #[arg(long)]
        log_level: Option<String>,

        /// Seed demo libraries, languages and translations on startup
        #[arg(long)]
        seed_demo: bool,
    },
    /// Run the MCP server on stdio
    McpServer {
        /// Hub API address to search against, overrides the config file
        #[arg(long)]
        hub_url: Option<String>,

        /// Log level for diagnostics on stderr
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve {
        listen_addr: None,
        log_level: None,
        seed_demo: false,
    });

    match command {
        Commands::Serve {
            listen_addr,
            log_level,
            seed_demo,
        } => serve(&cli.config, listen_addr, log_level, seed_demo).await,
        Commands::McpServer { hub_url, log_level } => {
            mcp_server(&cli.config, hub_url, &log_level).await
        }
    }
}

/// Load the config file, falling back to defaults when it is absent.
fn load_config(path: &Path) -> anyhow::Result<HubConfig> {
    if path.exists() {
        Ok(HubConfig::load_yaml(path)?)
    } else {
        Ok(HubConfig::default())
    }
}

/// Run the hub HTTP API.
async fn serve(
    config_path: &Path,
    listen_addr: Option<SocketAddr>,
    log_level: Option<String>,
    seed_demo: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(addr) = listen_addr {
        config.listen_addr = addr;
    }
    if let Some(level) = log_level {
        config.log_level = level;
    }

    init_logging(&config.log_level, LogFormat::parse(&config.log_format));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "Starting Atheneum hub"
    );
    if !config_path.exists() {
        tracing::info!(
            config = %config_path.display(),
            "Config file not found, using defaults"
        );
    }

    let addr = config.listen_addr;
    let state = AppState::from_config(config)?;
    if seed_demo {
        fixtures::seed_demo(&state);
    }
    state.health.set_ready(true);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Hub API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run the MCP server on stdio, searching the directory over HTTP.
async fn mcp_server(
    config_path: &Path,
    hub_url: Option<String>,
    log_level: &str,
) -> anyhow::Result<()> {
    init_stderr_logging(log_level);

    let config = load_config(config_path)?;
    let hub_url = hub_url.unwrap_or(config.hub_url);
    tracing::info!(hub_url = %hub_url, "Starting MCP server on stdio");

    let search = HttpSearch::new(hub_url)?;
    let session = McpSession::new(Arc::new(search));
    session.run_stdio().await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
