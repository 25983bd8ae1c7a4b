//! Product search endpoint
//!
//! `GET /search?query=<text>` answers with one `Found product: <name>` line
//! per match. Nothing is written until every row has been read and escaped,
//! so a failing row produces a clean 500 instead of a truncated listing.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::db::search_products;
use crate::http::error::ApiError;
use crate::http::extractors::ValidSearchQuery;
use crate::http::server::AppState;
use crate::sanitize::render_listing;

/// GET /search - substring search over product names
async fn search(
    State(state): State<Arc<AppState>>,
    ValidSearchQuery(query): ValidSearchQuery,
) -> Result<Response, ApiError> {
    tracing::debug!(query_len = query.as_str().len(), "search request");

    let names = tokio::time::timeout(
        state.query_timeout,
        search_products(state.store.as_ref(), &query),
    )
    .await
    .map_err(|_| ApiError::Timeout {
        after: state.query_timeout,
    })??;

    tracing::debug!(matches = names.len(), "search complete");

    let body = render_listing(&names);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

/// Any method other than GET/HEAD on /search
async fn method_not_supported(method: Method) -> ApiError {
    ApiError::MethodNotAllowed { method }
}

/// Search routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search).fallback(method_not_supported))
}
