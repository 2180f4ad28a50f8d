//! Claims Compliance Domain
//!
//! This crate holds the pure, I/O-free parts of claim processing: reading an
//! externally constructed claim record, checking it against the regulatory
//! field rules, and describing the hand-off to the external workflow engine.
//!
//! # Validation Flow
//!
//! ```text
//! ClaimRecord -> required fields -> identifier systems -> patient national ID -> ValidationResult
//! ```
//!
//! Expected failures (missing fields, malformed identifiers) are reported as
//! data in [`ValidationResult`], never as errors.

pub mod claim;
pub mod national_id;
pub mod validation;
pub mod workflow;
pub mod error;

pub use claim::{ClaimRecord, ClaimField, ClaimIdentifier};
pub use national_id::{validate_national_id, luhn_check_digit};
pub use validation::{
    ClaimValidator, ValidationResult, ValidationIssue, Severity,
    NPHIES_IDENTIFIER_SYSTEM,
};
pub use workflow::{
    WorkflowDispatch, WorkflowAck, WorkflowDispatcher, ClaimWorkflowPayload,
    CLAIM_PROCESSING_WORKFLOW,
};
pub use error::ClaimError;
