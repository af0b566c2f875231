// Authentication and authorization error types

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::users::store::StoreError;

/// Message returned for every failed credential presentation
pub const CREDENTIAL_MISMATCH_MESSAGE: &str = "User or password mismatch";

/// Authentication and authorization error types
///
/// The token and gate variants are kept apart for logging and tests, but they
/// all render as the same 401 so callers cannot tell which check failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Request errors
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Authentication errors
    /// Unknown username or wrong password; deliberately indistinguishable
    #[error("Credential mismatch")]
    CredentialMismatch,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    ExpiredToken,

    // Authorization errors
    /// Caller's identity is gone or holds a different role
    #[error("Not permitted")]
    NotPermitted,

    // Internal errors
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Identity store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// True for every variant that means "treat the caller as unauthenticated"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidToken(_)
                | AuthError::InvalidSignature
                | AuthError::ExpiredToken
                | AuthError::NotPermitted
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => ApiError::ValidationError(errors),
            AuthError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AuthError::CredentialMismatch => ApiError::Forbidden(CREDENTIAL_MISMATCH_MESSAGE.to_string()),
            err if err.is_unauthenticated() => ApiError::Unauthorized(err.to_string()),
            AuthError::Store(StoreError::Conflict(msg)) => ApiError::Conflict { message: msg },
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rejections_share_one_status() {
        let rejections = vec![
            AuthError::MissingToken,
            AuthError::InvalidToken("bad".to_string()),
            AuthError::InvalidSignature,
            AuthError::ExpiredToken,
            AuthError::NotPermitted,
        ];

        for rejection in rejections {
            let reason = rejection.to_string();
            let api: ApiError = rejection.into();
            assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
            assert!(matches!(api, ApiError::Unauthorized(ref r) if *r == reason));
            assert_eq!(api.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_credential_mismatch_is_forbidden_with_fixed_message() {
        let api: ApiError = AuthError::CredentialMismatch.into();
        assert_eq!(api.status_code(), StatusCode::FORBIDDEN);
        assert!(matches!(api, ApiError::Forbidden(ref m) if m == CREDENTIAL_MISMATCH_MESSAGE));
    }

    #[test]
    fn test_internal_failures_are_server_errors() {
        let failures = vec![
            AuthError::PasswordHash("boom".to_string()),
            AuthError::TokenGeneration("boom".to_string()),
            AuthError::Store(StoreError::Database("connection refused".to_string())),
        ];

        for failure in failures {
            let api: ApiError = failure.into();
            assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let api: ApiError = AuthError::Store(StoreError::Conflict("taken".to_string())).into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
    }
}
