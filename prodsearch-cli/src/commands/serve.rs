//! HTTP server command
//!
//! Reads credentials, connects with retry, and serves `/search` until a
//! shutdown signal arrives. The pool is closed after the server stops.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use prodsearch_server::config::{DEFAULT_DB_HOST, DEFAULT_DB_PORT, DEFAULT_MAX_CONNECTIONS};
use prodsearch_server::{
    create_pool, run_server, AppState, DbConfig, DbCredentials, ProductRepo, RetryPolicy,
    ServerConfig,
};

/// Arguments for the serve command
///
/// Credentials are read from DB_USER, DB_PASSWORD and DB_NAME only.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "SEARCH_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = DEFAULT_DB_HOST)]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_DB_PORT)]
    pub db_port: u16,

    /// Maximum pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Startup ping attempts before giving up
    #[arg(long, env = "DB_CONNECT_ATTEMPTS", default_value_t = 5)]
    pub connect_attempts: u32,

    /// Per-query deadline in seconds
    #[arg(long, env = "SEARCH_QUERY_TIMEOUT_SECS", default_value_t = 10)]
    pub query_timeout_secs: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let credentials = DbCredentials::from_env().context("Database credentials missing")?;

    let db_config = DbConfig {
        host: args.db_host,
        port: args.db_port,
        max_connections: args.max_connections,
        ..DbConfig::new(credentials)
    };
    db_config.validate().context("Invalid database configuration")?;

    let policy = RetryPolicy::default().with_max_attempts(args.connect_attempts);

    let pool = create_pool(&db_config, &policy)
        .await
        .context("Failed to connect to database")?;

    let repo = ProductRepo::new(pool);
    let state = AppState::new(Arc::new(repo.clone()))
        .with_query_timeout(Duration::from_secs(args.query_timeout_secs));

    tracing::info!("Starting prodsearch server on {}", args.bind);
    let served = run_server(state, ServerConfig { bind_addr: args.bind }).await;

    // Release the handle on every exit path
    repo.pool().close().await;
    tracing::info!("Database pool closed");

    served.context("Server error")
}
