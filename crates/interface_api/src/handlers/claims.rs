//! Claims handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::Value;

use claims_pipeline::{PipelineOutcome, PipelineResult};
use domain_claims::ClaimRecord;

use crate::auth::Claims;
use crate::dto::claims::ValidationResponse;
use crate::{error::ApiError, AppState};

/// Runs a claim through the pipeline
///
/// The body is always the pipeline outcome; the status code reflects which
/// terminal state was reached.
pub async fn process_claim(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<PipelineOutcome>), ApiError> {
    let claim = ClaimRecord::from_value(body)?;
    let outcome = state.pipeline.process_claim(claim, &user.role).await?;

    Ok((status_for(&outcome.result), Json(outcome)))
}

/// Validates a claim without dispatching it
pub async fn validate_claim(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let claim = ClaimRecord::from_value(body)?;
    let outcome = state.pipeline.validate_only(&claim, &user.role).await?;

    match outcome.result {
        PipelineResult::Validated { claim_id, validation } => Ok(Json(ValidationResponse {
            claim_id,
            validation,
            audit: outcome.audit,
        })),
        PipelineResult::Unauthorized { role, action } => Err(ApiError::Forbidden(format!(
            "Role '{}' is not permitted to perform '{}'",
            role, action
        ))),
        other => Err(ApiError::Internal(format!(
            "Unexpected validation outcome '{}'",
            other.label()
        ))),
    }
}

/// HTTP status for a terminal pipeline state
pub fn status_for(result: &PipelineResult) -> StatusCode {
    match result {
        PipelineResult::Processed { .. } | PipelineResult::Validated { .. } => StatusCode::OK,
        PipelineResult::Unauthorized { .. } => StatusCode::FORBIDDEN,
        PipelineResult::NonCompliant { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineResult::DispatchFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}
