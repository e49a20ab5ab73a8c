//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::erp::ErpError;
use crate::pipeline::ExtractionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Input is not in the delimited export format")]
    FormatMismatch,
    #[error("Assistant reply unreadable: {0}")]
    ReplyUnreadable(String),
    #[error("Assistant unavailable: {0}")]
    AssistantUnavailable(String),
    #[error("No assistant configured")]
    AssistantNotConfigured,
    #[error("ERP authentication failed")]
    ErpAuthFailed,
    #[error("ERP unavailable: {0}")]
    ErpUnavailable(String),
    #[error("No ERP configured")]
    ErpNotConfigured,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::FormatMismatch => (
                StatusCode::BAD_REQUEST,
                "FORMAT_MISMATCH",
                "Input does not match the delimited export format (no CANT./COD. TN records)"
                    .to_string(),
            ),
            ApiError::ReplyUnreadable(excerpt) => (
                StatusCode::BAD_GATEWAY,
                "ASSISTANT_REPLY_UNREADABLE",
                format!("Assistant reply was not a JSON array. Reply begins: {excerpt}"),
            ),
            ApiError::AssistantUnavailable(detail) => {
                tracing::error!(detail = %detail, "Assistant call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "ASSISTANT_UNAVAILABLE",
                    "The extraction assistant could not be reached".to_string(),
                )
            }
            ApiError::AssistantNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ASSISTANT_NOT_CONFIGURED",
                "Only delimited exports can be processed: no assistant is configured".to_string(),
            ),
            ApiError::ErpAuthFailed => (
                StatusCode::UNAUTHORIZED,
                "ERP_AUTH_FAILED",
                "ERP credentials were rejected".to_string(),
            ),
            ApiError::ErpUnavailable(detail) => {
                tracing::error!(detail = %detail, "ERP call failed");
                (StatusCode::BAD_GATEWAY, "ERP_UNAVAILABLE", detail.clone())
            }
            ApiError::ErpNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ERP_NOT_CONFIGURED",
                "No ERP connection is configured".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::FormatMismatch => ApiError::FormatMismatch,
            ExtractionError::EmptyInput => ApiError::BadRequest(err.to_string()),
            ExtractionError::Decode(e) => ApiError::ReplyUnreadable(e.excerpt),
            ExtractionError::Assistant(e) => ApiError::AssistantUnavailable(e.to_string()),
            ExtractionError::AssistantNotConfigured => ApiError::AssistantNotConfigured,
        }
    }
}

impl From<ErpError> for ApiError {
    fn from(err: ErpError) -> Self {
        match err {
            ErpError::AuthenticationFailed => ApiError::ErpAuthFailed,
            other => ApiError::ErpUnavailable(other.to_string()),
        }
    }
}
