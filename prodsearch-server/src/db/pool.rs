//! Database connection pool management
//!
//! Proves the database is alive with a bounded loop of direct
//! connect-and-ping probes, then opens a sqlx `MySqlPool` lazily.
//! Each probe surfaces its own failure (refused, auth, unknown database).
//!
//! This is the only place a failure is allowed to stop the process: the
//! caller exits when `create_pool` gives up.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPoolOptions};
use sqlx::{Connection, MySqlPool};

use super::retry::RetryPolicy;
use crate::config::DbConfig;

/// Upper bound for one probe's connect + ping.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a request waits for a free pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection manager error
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("database unreachable after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Liveness check against the backing database.
#[async_trait]
pub trait Ping: Send + Sync {
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Opens a fresh connection per ping, outside any pool
pub struct ConnectProbe {
    options: MySqlConnectOptions,
    timeout: Duration,
}

impl ConnectProbe {
    pub fn new(options: MySqlConnectOptions) -> Self {
        Self {
            options,
            timeout: PROBE_TIMEOUT,
        }
    }
}

#[async_trait]
impl Ping for ConnectProbe {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        let probe = async {
            let mut conn = MySqlConnection::connect_with(&self.options).await?;
            conn.ping().await?;
            conn.close().await
        };

        tokio::time::timeout(self.timeout, probe)
            .await
            .map_err(|_| {
                sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connect timed out after {}s", self.timeout.as_secs()),
                ))
            })?
    }
}

/// Ping `target` until it answers or the policy runs out of attempts.
///
/// Each failure is logged with its attempt number. There is no sleep after
/// the final attempt. Returns the number of attempts it took to succeed.
pub async fn ping_with_retry<P>(target: &P, policy: &RetryPolicy) -> Result<u32, ConnectError>
where
    P: Ping + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match target.ping().await {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!(attempt, "database reachable after retry");
                }
                return Ok(attempt);
            }
            Err(e) => {
                tracing::warn!(attempt, max_attempts, error = %e, "database ping failed");

                if attempt >= max_attempts {
                    return Err(ConnectError::Exhausted {
                        attempts: attempt,
                        source: e,
                    });
                }

                let delay = policy.delay_after(attempt);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "waiting before next ping");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Create a MySQL connection pool and wait until it is reachable.
///
/// # Errors
///
/// Returns [`ConnectError::Exhausted`] once every ping attempt has failed.
/// No pool is created in that case.
///
/// # Example
///
/// ```ignore
/// let config = DbConfig::new(DbCredentials::from_env()?);
/// let pool = create_pool(&config, &RetryPolicy::default()).await?;
/// ```
pub async fn create_pool(config: &DbConfig, policy: &RetryPolicy) -> Result<MySqlPool, ConnectError> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.credentials.database,
        max_connections = config.max_connections,
        "connecting to database"
    );

    ping_with_retry(&ConnectProbe::new(config.connect_options()), policy).await?;

    Ok(MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(config.connect_options()))
}
