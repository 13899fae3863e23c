//! AgentMart Server
//!
//! HTTP server for the AgentMart agent marketplace.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (PostgreSQL from DATABASE_URL)
//! agentmart-server
//!
//! # Local development against the in-memory store
//! agentmart-server --dev-mode
//!
//! # Environment overrides
//! AGENTMART__SERVER__PORT=9000 AGENTMART__CHAIN__NODE_URL=http://node:80 agentmart-server
//! ```

mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentmart_api::{create_router, AppState};
use agentmart_chain::NodeClient;
use agentmart_db::{open_store, CatalogStore, StoreBackend};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// AgentMart Server - marketplace for MCP agents
#[derive(Parser, Debug)]
#[command(name = "agentmart-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "AGENTMART_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "AGENTMART_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AGENTMART_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGENTMART_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "AGENTMART_LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Chain node base URL
    #[arg(long, env = "AGENTMART_NODE_URL")]
    node_url: Option<String>,

    /// Run against the in-memory store
    #[arg(long, env = "AGENTMART_DEV_MODE")]
    dev_mode: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    apply_args(&mut server_config, args);

    init_logging(&server_config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting AgentMart Server");

    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    let store_config = server_config.database.to_store_config();
    if store_config.backend == StoreBackend::Postgres {
        tracing::info!(url = %store_config.postgres_url_masked(), "Connecting to database...");
    }
    let store = open_store(&store_config).await?;

    let health = store.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Catalog store health check failed");
    }
    tracing::info!(backend = ?health.backend, "Catalog store ready");

    let node = NodeClient::new(server_config.chain.to_node_config())?;
    if !node.is_configured() {
        tracing::warn!("Chain node URL not configured; transaction submission will fail");
    }

    let state = Arc::new(AppState::new(store.clone(), Arc::new(node)));
    let app = create_router(state, server_config.api.to_api_config());

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(signalled.clone()))
        .into_future();
    let drain_deadline = drain_deadline(signalled, server_config.server.shutdown_timeout());

    tokio::select! {
        result = server => result?,
        _ = drain_deadline => {
            tracing::warn!("In-flight requests did not finish before the shutdown timeout");
        }
    }

    store.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// CLI flags win over files and environment
fn apply_args(config: &mut ServerConfig, args: Args) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.postgres_url = url;
    }
    if let Some(url) = args.node_url {
        config.chain.node_url = Some(url);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if args.dev_mode {
        config.database.backend = StoreBackend::Memory;
    }
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).try_init()?,
        _ => subscriber.with(fmt::layer().pretty().with_target(true)).try_init()?,
    }

    Ok(())
}

/// Install the Prometheus exporter on its own listener
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port = config.port, "Metrics server started");
    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM), then let axum drain
async fn shutdown_signal(signalled: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    signalled.notify_one();
}

/// Resolves `timeout` after the shutdown signal; never before it
async fn drain_deadline(signalled: Arc<Notify>, timeout: Duration) {
    signalled.notified().await;
    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );
    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================
