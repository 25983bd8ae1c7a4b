//! prodsearch-server: product name search over HTTP
//!
//! A single `GET /search?query=...` endpoint backed by a MySQL pool:
//! - Connection manager with bounded ping retry at startup
//! - Bound-parameter `LIKE` query (statement text never built from input)
//! - Markup-escaped, newline-delimited plain-text output

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod sanitize;

pub use config::{ConfigError, DbConfig, DbCredentials};
pub use db::{create_pool, ConnectError, DbError, ProductRepo, ProductStore, RetryPolicy};
pub use http::{router, run_server, ApiError, AppState, ServerConfig};
