//! Error types for chantrack-server
//!
//! Every failure is converted to an [`ApiError`] at the handler boundary.
//! Server-side failures are logged with full detail; callers only ever see
//! a generic message for them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chantrack_common::api::ErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

use crate::identity::IdentityError;
use crate::resolver::ResolveError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or unverifiable credential (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unusable request or a URL that resolves to no channel (400)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identity provider or YouTube API failure (500)
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Database failure (500)
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Client address exceeded its request quota (429)
    #[error("Too many requests")]
    RateLimited,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized(detail) => {
                warn!("Rejected credential: {}", detail);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized".to_string())
            }
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            ApiError::UpstreamFailure(detail) => {
                error!("Upstream failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_FAILURE",
                    "Internal server error".to_string(),
                )
            }
            ApiError::StorageFailure(detail) => {
                error!("Storage failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_FAILURE",
                    "Internal server error".to_string(),
                )
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please try again later".to_string(),
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingCredential | IdentityError::Rejected(_) => {
                ApiError::Unauthorized(err.to_string())
            }
            IdentityError::Provider(_) => ApiError::UpstreamFailure(err.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError::UpstreamFailure(err.to_string())
    }
}

impl From<chantrack_common::Error> for ApiError {
    fn from(err: chantrack_common::Error) -> Self {
        ApiError::StorageFailure(err.to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::MetadataError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::UpstreamFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::StorageFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_identity_error_mapping() {
        assert!(matches!(
            ApiError::from(IdentityError::MissingCredential),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(IdentityError::Rejected("expired".into())),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(IdentityError::Provider("timeout".into())),
            ApiError::UpstreamFailure(_)
        ));
    }

    #[test]
    fn test_resolve_error_is_upstream_failure() {
        let err = ResolveError::Lookup(MetadataError::Network("refused".into()));
        assert!(matches!(ApiError::from(err), ApiError::UpstreamFailure(_)));
    }
}
