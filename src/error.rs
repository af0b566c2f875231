// Error handling module for the Rental API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Message rendered for every 401
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Main error type for the API
/// All handlers return Result<T, ApiError> (directly or through a module error)
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Field validation errors from request DTOs
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed input that is not tied to a single field
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found
    /// Maps to HTTP 404 Not Found
    NotFound { message: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    /// The detail is logged and never sent to the client
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    /// Carries the internal reason for the log; the client only sees "Unauthorized"
    Unauthorized(String),

    /// Authorization failures
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),
}

/// Consistent error response structure
///
/// `trace_id` is also written to the log line for the failure so a client
/// report can be matched to the server-side detail.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND_ERROR")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level validation errors, omitted when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    pub trace_id: String,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: String, details: Option<serde_json::Value>, trace_id: Uuid) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            details,
            trace_id: trace_id.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// - error!: internal errors (500-level)
    /// - warn!: security relevant client errors (401, 403, 409)
    /// - debug!: expected client errors (validation, not found)
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let trace_id = Uuid::new_v4();

        match self {
            ApiError::ValidationError(errors) => {
                debug!(%trace_id, "Validation error: {:?}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "VALIDATION_ERROR",
                        "Request validation failed".to_string(),
                        Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                        trace_id,
                    ),
                )
            }
            ApiError::BadRequest(message) => {
                debug!(%trace_id, "Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("BAD_REQUEST_ERROR", message.clone(), None, trace_id),
                )
            }
            ApiError::NotFound { message } => {
                debug!(%trace_id, "Not found: {}", message);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND_ERROR", message.clone(), None, trace_id),
                )
            }
            ApiError::Conflict { message } => {
                warn!(%trace_id, "Conflict error: {}", message);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("CONFLICT_ERROR", message.clone(), None, trace_id),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!(%trace_id, "Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "UNEXPECTED_ERROR",
                        format!(
                            "An unexpected error occurred. Please report the id {} so we can help you.",
                            trace_id
                        ),
                        None,
                        trace_id,
                    ),
                )
            }
            ApiError::Unauthorized(reason) => {
                warn!(%trace_id, "Unauthorized: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("UNAUTHORIZED", UNAUTHORIZED_MESSAGE.to_string(), None, trace_id),
                )
            }
            ApiError::Forbidden(message) => {
                warn!(%trace_id, "Forbidden: {}", message);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse::new("FORBIDDEN_ERROR", message.clone(), None, trace_id),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
