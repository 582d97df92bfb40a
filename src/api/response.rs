//! Response types for the timesheet engine API.
//!
//! Errors carry a stable machine-readable code; workflow conflicts map to
//! 409 so clients can explain to the user why an operation was rejected.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::Validation { .. }
            | EngineError::InvalidClockTime { .. }
            | EngineError::InvalidMonth { .. } => StatusCode::BAD_REQUEST,

            EngineError::NotPermitted { .. } => StatusCode::FORBIDDEN,

            EngineError::WorkerNotFound { .. }
            | EngineError::TimesheetNotFound { .. }
            | EngineError::SubmissionNotFound { .. }
            | EngineError::SignatureNotFound { .. }
            | EngineError::TokenInvalid => StatusCode::NOT_FOUND,

            EngineError::TokenExpired { .. } => StatusCode::GONE,

            EngineError::TimesheetLocked { .. }
            | EngineError::UnconfirmedShifts { .. }
            | EngineError::RecipientAlreadySigned
            | EngineError::SubmissionCompleted
            | EngineError::StatusChanged => StatusCode::CONFLICT,

            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::NotificationFailed { .. }
            | EngineError::DocumentFailed { .. }
            | EngineError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // never leak internals for unexpected failures
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            ApiError::new("INTERNAL_ERROR", "Internal error")
        } else {
            ApiError::new(error.code(), error.to_string())
        };

        ApiErrorResponse { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409_with_their_code() {
        let response: ApiErrorResponse = EngineError::RecipientAlreadySigned.into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "RECIPIENT_ALREADY_SIGNED");

        let response: ApiErrorResponse = EngineError::StatusChanged.into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "STATUS_CHANGED");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response: ApiErrorResponse = EngineError::InvalidClockTime {
            value: "99:00".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "INVALID_TIME");
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let response: ApiErrorResponse = EngineError::Store {
            message: "connection string postgres://secret".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "INTERNAL_ERROR");
        assert!(!response.error.message.contains("secret"));
    }

    #[test]
    fn test_expired_token_maps_to_410() {
        let response: ApiErrorResponse = EngineError::TokenExpired {
            expired_at: chrono::Utc::now(),
        }
        .into();
        assert_eq!(response.status, StatusCode::GONE);
    }
}
