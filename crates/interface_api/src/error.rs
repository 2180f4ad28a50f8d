//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use claims_pipeline::PipelineError;
use domain_claims::ClaimError;
use infra_audit::AuditError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The audit trail could not be written or read
    #[error("Audit unavailable: {message}")]
    AuditUnavailable {
        message: String,
        details: Option<Vec<String>>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::AuditUnavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "audit_unavailable",
                message,
                details,
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        error!(error = %err, "Audit trail access failed");
        if err.is_unavailable() {
            ApiError::AuditUnavailable {
                message: err.to_string(),
                details: None,
            }
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        error!(step = %err.step(), error = %err, "Claim pipeline failed");
        match err {
            PipelineError::AuditRequired { step, result, source } => ApiError::AuditUnavailable {
                message: format!("Audit entry required for {} step: {}", step, source),
                details: Some(vec![format!("outcome: {}", result.label())]),
            },
            PipelineError::Internal { step, message } => {
                ApiError::Internal(format!("Pipeline {} step failed: {}", step, message))
            }
        }
    }
}
