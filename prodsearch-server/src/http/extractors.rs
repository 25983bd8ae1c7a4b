//! Custom Axum extractors

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use super::error::ApiError;
use crate::models::{SearchQuery, ValidationError};

/// Extract and validate the `query` parameter from the query string
///
/// When the parameter repeats, the first occurrence wins.
pub struct ValidSearchQuery(pub SearchQuery);

impl<S> FromRequestParts<S> for ValidSearchQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs): Query<Vec<(String, String)>> = Query::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::warn!(error = %rejection, "unreadable query string");
                ApiError::Validation(ValidationError::Empty { field: "query" })
            })?;

        let raw = pairs
            .into_iter()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value)
            .unwrap_or_default();

        Ok(Self(SearchQuery::new(&raw)?))
    }
}
