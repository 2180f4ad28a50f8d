//! Audit trail handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use domain_access::actions;

use crate::auth::Claims;
use crate::dto::claims::{AuditLogResponse, AuditQuery};
use crate::{error::ApiError, AppState};

/// Lists decrypted audit entries
///
/// Requires `audit:read`. Reading the trail is itself not audited.
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    state
        .pipeline
        .access()
        .authorize(&user.role, actions::AUDIT_READ)
        .map_err(|e| ApiError::Forbidden(e.to_string()))?;

    let reader = state.pipeline.recorder().reader();
    let entries = match &query.resource_id {
        Some(resource_id) => reader.for_resource(resource_id).await?,
        None => reader.read_all().await?,
    };

    let entries: Vec<_> = entries
        .into_iter()
        .filter(|e| query.action.as_deref().map_or(true, |action| e.action == action))
        .collect();

    Ok(Json(AuditLogResponse {
        count: entries.len(),
        entries,
    }))
}
