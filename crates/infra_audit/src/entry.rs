//! Audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::AuditEventId;

/// One line of the audit trail
///
/// Immutable once appended. `encrypted_details` is the base64 sealed form of
/// the details and never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditEventId,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor_role: String,
    pub resource_id: String,
    pub encrypted_details: String,
}

/// An audit record with its details decrypted, for review by auditors
///
/// `details` is `None` when the entry could not be opened with the reader's
/// key, typically because it was sealed before a key change. The envelope
/// fields are plaintext on disk and always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedAuditEntry {
    pub id: AuditEventId,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor_role: String,
    pub resource_id: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl DecryptedAuditEntry {
    /// Whether the details could not be decrypted
    pub fn is_sealed(&self) -> bool {
        self.details.is_none()
    }
}
