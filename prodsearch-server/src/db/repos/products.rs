//! Product repository
//!
//! One statement, one bound parameter. The statement text is a `&'static str`
//! so nothing derived from a request can end up inside it.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{MySqlPool, Row};

use crate::models::SearchQuery;

/// Substring search over product names. `?` is bound to `%<query>%`.
pub const SEARCH_PRODUCTS_SQL: &str = "SELECT name FROM products WHERE name LIKE ?";

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Statement preparation or execution failed
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A row could not be decoded
    #[error("row decode failed: {0}")]
    Scan(#[source] sqlx::Error),
}

/// Read access to product names.
///
/// Implementations must return either every matching name or an error,
/// never a partial list.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Run `sql` with `pattern` bound as its single parameter and collect
    /// the `name` column.
    async fn fetch_names(&self, sql: &'static str, pattern: &str) -> Result<Vec<String>, DbError>;
}

/// Search product names containing `query`.
pub async fn search_products(
    store: &dyn ProductStore,
    query: &SearchQuery,
) -> Result<Vec<String>, DbError> {
    store
        .fetch_names(SEARCH_PRODUCTS_SQL, &query.like_pattern())
        .await
}

/// Product repository backed by the shared pool
#[derive(Clone)]
pub struct ProductRepo {
    pool: MySqlPool,
}

impl ProductRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for ProductRepo {
    async fn fetch_names(&self, sql: &'static str, pattern: &str) -> Result<Vec<String>, DbError> {
        // The stream owns the prepared statement and its connection; both are
        // released when it drops, on every return path below.
        let mut rows = sqlx::query(sql).bind(pattern).fetch(&self.pool);
        let mut names = Vec::new();

        while let Some(row) = rows.try_next().await.map_err(DbError::Query)? {
            let name: String = row.try_get("name").map_err(DbError::Scan)?;
            names.push(name);
        }

        Ok(names)
    }
}
