//! Claims domain errors

use thiserror::Error;

/// Errors raised while reading a claim record
///
/// Rule violations are not errors; they are collected into a
/// `ValidationResult`. These variants cover input that cannot be treated as
/// a claim at all.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim record must be a JSON object, got {0}")]
    NotAnObject(String),
}
