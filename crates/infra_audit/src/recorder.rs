//! Audit recorder
//!
//! Turns an action and its details into an encrypted [`AuditEntry`] and
//! appends it to the configured sink.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use core_kernel::AuditEventId;

use crate::cipher::AuditCipher;
use crate::entry::AuditEntry;
use crate::error::AuditError;
use crate::reader::AuditLogReader;
use crate::sink::AuditSink;

/// Default bound on a single append
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reference to a successfully appended entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditReceipt {
    pub entry_id: AuditEventId,
    pub timestamp: DateTime<Utc>,
}

/// Encrypts and appends audit entries
///
/// Key material and sink location are fixed at construction and never
/// change for the lifetime of the recorder.
#[derive(Clone)]
pub struct AuditRecorder {
    cipher: Arc<dyn AuditCipher>,
    sink: Arc<dyn AuditSink>,
    timeout: Duration,
}

impl AuditRecorder {
    pub fn new(cipher: Arc<dyn AuditCipher>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            cipher,
            sink,
            timeout: DEFAULT_AUDIT_TIMEOUT,
        }
    }

    /// Sets the bound on a single append
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Records one action
    ///
    /// Failures are logged at `error` level and returned; callers treat the
    /// result as informational and never gate their primary outcome on it
    /// unless their audit policy requires it.
    pub async fn record<D>(
        &self,
        action: &str,
        actor_role: &str,
        resource_id: &str,
        details: &D,
    ) -> Result<AuditReceipt, AuditError>
    where
        D: Serialize + ?Sized,
    {
        let result = self.try_record(action, actor_role, resource_id, details).await;

        match &result {
            Ok(receipt) => debug!(
                action,
                resource_id,
                entry_id = %receipt.entry_id,
                "Audit entry recorded"
            ),
            Err(e) => error!(
                action,
                actor_role,
                resource_id,
                sink = %self.sink.describe(),
                error = %e,
                "Failed to write audit entry"
            ),
        }

        result
    }

    async fn try_record<D>(
        &self,
        action: &str,
        actor_role: &str,
        resource_id: &str,
        details: &D,
    ) -> Result<AuditReceipt, AuditError>
    where
        D: Serialize + ?Sized,
    {
        let plaintext = canonical_json(details)?;
        let sealed = self.cipher.seal(&plaintext)?;

        let entry = AuditEntry {
            id: AuditEventId::new_v7(),
            timestamp: Utc::now(),
            action: action.to_string(),
            actor_role: actor_role.to_string(),
            resource_id: resource_id.to_string(),
            encrypted_details: general_purpose::STANDARD.encode(sealed),
        };

        tokio::time::timeout(self.timeout, self.sink.append(&entry))
            .await
            .map_err(|_| AuditError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            })??;

        Ok(AuditReceipt {
            entry_id: entry.id,
            timestamp: entry.timestamp,
        })
    }

    /// A reader over the same sink and key
    pub fn reader(&self) -> AuditLogReader {
        AuditLogReader::new(Arc::clone(&self.cipher), Arc::clone(&self.sink))
    }

    pub fn sink(&self) -> &Arc<dyn AuditSink> {
        &self.sink
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("sink", &self.sink.describe())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Serializes details with object keys sorted at every depth, so logically
/// equal details always produce the same plaintext
pub(crate) fn canonical_json<D: Serialize + ?Sized>(details: &D) -> Result<Vec<u8>, AuditError> {
    let value = sort_keys(serde_json::to_value(details)?);
    Ok(serde_json::to_vec(&value)?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
