//! Database configuration sourced from the environment
//!
//! Credentials come from `DB_USER`, `DB_PASSWORD` and `DB_NAME` only. They are
//! never defaulted: a missing or empty variable is a startup error.

use std::fmt;

use sqlx::mysql::MySqlConnectOptions;

/// Default MySQL host when `DB_HOST` is unset.
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";

/// Default MySQL port when `DB_PORT` is unset.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default maximum connections for the pool.
/// Kept low; every request runs a single short query.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration error raised before anything touches the network
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {var} is not set")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Database login credentials.
///
/// `Debug` output redacts the password so the struct can be logged safely.
#[derive(Clone)]
pub struct DbCredentials {
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbCredentials {
    pub const USER_VAR: &'static str = "DB_USER";
    pub const PASSWORD_VAR: &'static str = "DB_PASSWORD";
    pub const DATABASE_VAR: &'static str = "DB_NAME";

    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    ///
    /// All three values must be present and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        Ok(Self {
            user: required(Self::USER_VAR)?,
            password: required(Self::PASSWORD_VAR)?,
            database: required(Self::DATABASE_VAR)?,
        })
    }
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Everything needed to open the pool
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub credentials: DbCredentials,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(credentials: DbCredentials) -> Self {
        Self {
            credentials,
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Reject settings the pool cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DB_HOST",
                reason: "host cannot be empty".into(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Build driver connect options field by field.
    ///
    /// No URL is formatted, so credentials containing `@`, `:` or `/` need no
    /// escaping and never show up in a connection string.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.credentials.user)
            .password(&self.credentials.password)
            .database(&self.credentials.database)
    }
}
