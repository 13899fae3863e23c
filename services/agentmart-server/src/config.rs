//! Server Configuration
//!
//! Layered configuration for the AgentMart server: built-in defaults,
//! `config/default` and `config/local` files, an optional explicit file,
//! then `AGENTMART__*` environment variables. CLI flags are applied last
//! in `main`.

use std::net::SocketAddr;
use std::time::Duration;

use agentmart_api::ApiConfig;
use agentmart_chain::NodeConfig;
use agentmart_db::{DatabaseConfig as StoreConfig, StoreBackend};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Catalog store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chain node configuration
    #[serde(default)]
    pub chain: ChainSettings,

    /// API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests on shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Catalog store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres` or `memory`
    #[serde(default)]
    pub backend: StoreBackend,

    /// PostgreSQL connection URL
    #[serde(default = "default_postgres_url")]
    pub postgres_url: String,

    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            postgres_url: default_postgres_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.backend,
            postgres_url: self.postgres_url.clone(),
            pg_max_connections: self.max_connections,
            pg_min_connections: self.min_connections,
            pg_acquire_timeout_secs: self.connect_timeout_secs,
            run_migrations: self.run_migrations,
        }
    }
}

/// Chain node settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Base URL of the node; submission fails with 500 when unset
    #[serde(default)]
    pub node_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_node_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            node_url: None,
            timeout_secs: default_node_timeout(),
        }
    }
}

impl ChainSettings {
    pub fn to_node_config(&self) -> NodeConfig {
        NodeConfig {
            node_url: self
                .node_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable response compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,

    /// Enable request tracing
    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiSettings {
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            enable_cors: self.enable_cors,
            cors_origins: self.cors_origins.clone(),
            enable_compression: self.enable_compression,
            enable_tracing: self.enable_tracing,
            max_body_size: self.max_body_size,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Export Prometheus metrics
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port for the Prometheus listener, separate from the API
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_postgres_url() -> String {
    "postgresql://localhost/agentmart".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_node_timeout() -> u64 {
    30
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AGENTMART")
                .separator("__")
                .try_parsing(true),
        );

        let server_config = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(server_config)
    }

    /// Configuration for local development: in-memory store, verbose logs
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert!(config.chain.node_url.is_none());
        assert_eq!(config.api.max_body_size, 1024 * 1024);
        assert!(config.server.socket_addr().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [server]
            port = 9000

            [database]
            backend = "memory"

            [chain]
            node_url = "http://node:8080"
        "#;
        let config: ServerConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.chain.timeout_secs, 30);
        assert_eq!(config.chain.to_node_config().node_url.as_deref(), Some("http://node:8080"));
    }

    #[test]
    fn test_blank_node_url_is_unconfigured() {
        let chain = ChainSettings {
            node_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(chain.to_node_config().node_url.is_none());
    }

    #[test]
    fn test_store_config_mapping() {
        let store = ServerConfig::development().database.to_store_config();
        assert_eq!(store.backend, StoreBackend::Memory);
        assert_eq!(store.pg_max_connections, 20);
    }
}
