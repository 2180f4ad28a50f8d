//! Audit trail review

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tracing::warn;

use crate::cipher::AuditCipher;
use crate::entry::{AuditEntry, DecryptedAuditEntry};
use crate::error::AuditError;
use crate::sink::AuditSink;

/// Reads the audit trail back and decrypts entry details
#[derive(Clone)]
pub struct AuditLogReader {
    cipher: Arc<dyn AuditCipher>,
    sink: Arc<dyn AuditSink>,
}

impl AuditLogReader {
    pub fn new(cipher: Arc<dyn AuditCipher>, sink: Arc<dyn AuditSink>) -> Self {
        Self { cipher, sink }
    }

    /// Every entry in append order, details decrypted
    ///
    /// An entry that cannot be opened is returned with `details: None` and
    /// logged; it does not fail the listing. Sink errors still do.
    pub async fn read_all(&self) -> Result<Vec<DecryptedAuditEntry>, AuditError> {
        Ok(self
            .sink
            .read_all()
            .await?
            .into_iter()
            .map(|entry| self.reveal(entry))
            .collect())
    }

    /// Entries recorded for one resource
    ///
    /// Filters on the plaintext `resourceId` before decrypting anything.
    pub async fn for_resource(&self, resource_id: &str) -> Result<Vec<DecryptedAuditEntry>, AuditError> {
        Ok(self
            .sink
            .read_all()
            .await?
            .into_iter()
            .filter(|entry| entry.resource_id == resource_id)
            .map(|entry| self.reveal(entry))
            .collect())
    }

    /// Decrypts a single stored entry
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Cipher`] when the entry was sealed under another
    /// key or its payload is damaged.
    pub fn decrypt(&self, entry: AuditEntry) -> Result<DecryptedAuditEntry, AuditError> {
        let details = self.open_details(&entry)?;
        Ok(Self::with_details(entry, Some(details)))
    }

    fn reveal(&self, entry: AuditEntry) -> DecryptedAuditEntry {
        match self.open_details(&entry) {
            Ok(details) => Self::with_details(entry, Some(details)),
            Err(e) => {
                warn!(
                    entry_id = %entry.id,
                    action = %entry.action,
                    resource_id = %entry.resource_id,
                    error = %e,
                    "Audit entry details could not be decrypted"
                );
                Self::with_details(entry, None)
            }
        }
    }

    fn open_details(&self, entry: &AuditEntry) -> Result<Value, AuditError> {
        let sealed = general_purpose::STANDARD
            .decode(&entry.encrypted_details)
            .map_err(|e| AuditError::Cipher(format!("invalid base64 in entry {}: {}", entry.id, e)))?;
        let plaintext = self.cipher.open(&sealed)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn with_details(entry: AuditEntry, details: Option<Value>) -> DecryptedAuditEntry {
        DecryptedAuditEntry {
            id: entry.id,
            timestamp: entry.timestamp,
            action: entry.action,
            actor_role: entry.actor_role,
            resource_id: entry.resource_id,
            details,
        }
    }
}

impl std::fmt::Debug for AuditLogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogReader")
            .field("sink", &self.sink.describe())
            .finish()
    }
}
