//! Claims DTOs

use serde::{Deserialize, Serialize};

use claims_pipeline::AuditStatus;
use domain_claims::ValidationResult;
use infra_audit::DecryptedAuditEntry;

/// Body of a successful validation request
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub claim_id: String,
    #[serde(flatten)]
    pub validation: ValidationResult,
    pub audit: AuditStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    /// Only entries for this claim
    pub resource_id: Option<String>,
    /// Only entries with this action
    pub action: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub count: usize,
    pub entries: Vec<DecryptedAuditEntry>,
}
