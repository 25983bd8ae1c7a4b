//! API error types with IntoResponse
//!
//! Errors become short plain-text responses. The underlying cause is logged
//! here, once, and never echoed to the client.

use std::time::Duration;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Anything but GET/HEAD on a read-only route (405)
    MethodNotAllowed { method: Method },

    /// Missing or invalid request parameter (400)
    Validation(ValidationError),

    /// Query preparation, execution or row decode failed (500, logged)
    Database(DbError),

    /// Query exceeded its deadline (504, logged)
    Timeout { after: Duration },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::MethodNotAllowed { method } => {
                tracing::warn!(%method, "rejected unsupported method");
                "Method is not supported.".to_string()
            }
            Self::Validation(e) => {
                tracing::warn!(error = %e, "rejected invalid request");
                match e {
                    ValidationError::Empty { .. } => "Query parameter is missing".to_string(),
                    other => other.to_string(),
                }
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "database error");
                "Query failed".to_string()
            }
            Self::Timeout { after } => {
                tracing::error!(timeout_ms = after.as_millis() as u64, "query timed out");
                "Query timed out".to_string()
            }
        };

        let mut response = (status, message).into_response();
        if matches!(self, Self::MethodNotAllowed { .. }) {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_parameter_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "query" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Query parameter is missing");
    }

    #[tokio::test]
    async fn too_long_is_400_with_reason() {
        let err = ApiError::Validation(ValidationError::TooLong {
            field: "query",
            max: 256,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("256"));
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let err = ApiError::MethodNotAllowed {
            method: Method::POST,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
        assert_eq!(body_text(response).await, "Method is not supported.");
    }

    #[tokio::test]
    async fn database_error_is_500_without_detail() {
        let err = ApiError::Database(DbError::Query(sqlx::Error::Protocol(
            "secret table layout".into(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert_eq!(body, "Query failed");
        assert!(!body.contains("secret"));
    }

    #[tokio::test]
    async fn timeout_is_504() {
        let err = ApiError::Timeout {
            after: Duration::from_secs(10),
        };
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
