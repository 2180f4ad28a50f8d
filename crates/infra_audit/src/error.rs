//! Audit error types
//!
//! Every failure to record an audit entry is reported through one of these
//! variants. `Unavailable` is kept distinct so callers can tell a storage
//! outage from a cipher or encoding fault.

use thiserror::Error;

/// Errors that can occur while writing or reading the audit trail
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit sink could not be opened or written
    #[error("Audit sink unavailable ({target}): {source}")]
    Unavailable {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The append did not finish within the configured timeout
    #[error("Audit append timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Sealing or opening the details failed
    #[error("Audit cipher failure: {0}")]
    Cipher(String),

    /// The configured key material is unusable
    #[error("Invalid audit key: {0}")]
    InvalidKey(String),

    /// Details or entry could not be serialized
    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be parsed
    #[error("Corrupt audit record at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

impl AuditError {
    /// Creates an Unavailable error for the given sink
    pub fn unavailable(target: impl Into<String>, source: std::io::Error) -> Self {
        AuditError::Unavailable {
            target: target.into(),
            source,
        }
    }

    /// Checks if the sink itself could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AuditError::Unavailable { .. } | AuditError::Timeout { .. })
    }
}
