//! Database layer - connection manager and repositories
//!
//! # Design Principles
//!
//! - One pool per process, created at startup and passed in, never global
//! - Startup pings retry with capped exponential backoff
//! - Bound parameters only, no string-built SQL

pub mod pool;
pub mod repos;
pub mod retry;

pub use pool::{create_pool, ping_with_retry, ConnectError, ConnectProbe, Ping};
pub use repos::*;
pub use retry::RetryPolicy;
