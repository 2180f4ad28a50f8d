//! Access control errors

use thiserror::Error;

/// Errors raised by the access control domain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Role '{role}' is not permitted to perform '{action}'")]
    Denied { role: String, action: String },
}
