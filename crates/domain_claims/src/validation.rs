//! Claim compliance rules
//!
//! This module checks a claim record against the NPHIES submission rules
//! and reports every violation it finds, in a stable order.
//!
//! # Validation Rules
//!
//! ## Required fields (errors)
//! - `identifier`, `status`, `type`, `patient`, `provider`, `priority`,
//!   `procedure`, `insurance`, `total` must be present and non-null
//! - Errors appear in this declaration order
//!
//! ## Identifier systems (warnings)
//! - Each claim identifier should use the `https://nphies.sa` system
//! - A foreign system lowers confidence but does not block processing
//!
//! ## Patient national ID (error)
//! - When a patient is referenced, the reference must be a valid national ID

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claim::{ClaimField, ClaimRecord};
use crate::national_id::validate_national_id;

/// Identifier system every claim identifier is expected to use
pub const NPHIES_IDENTIFIER_SYSTEM: &str = "https://nphies.sa";

/// Requirement recorded when a claim identifier uses the NPHIES system
pub const NPHIES_IDENTIFIER_PRESENT: &str = "NPHIES identifier present";

/// How much a finding matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks processing
    Error,
    /// Reported but does not affect compliance
    Warning,
}

/// A single finding with bilingual text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path the finding refers to
    pub field: String,
    /// English message
    pub message: String,
    pub severity: Severity,
    /// Arabic message
    pub localized_message: String,
}

impl ValidationIssue {
    fn error(field: impl Into<String>, message: String, localized_message: String) -> Self {
        Self {
            field: field.into(),
            message,
            severity: Severity::Error,
            localized_message,
        }
    }

    fn warning(field: impl Into<String>, message: String, localized_message: String) -> Self {
        Self {
            field: field.into(),
            message,
            severity: Severity::Warning,
            localized_message,
        }
    }
}

/// Result of claim validation
///
/// `is_compliant` is true exactly when `errors` is empty for results built by
/// [`ClaimValidator::validate`] or deserialized; deserialization recomputes
/// the flag from `errors` rather than trusting the input. Fields are public
/// for reporting, so code that mutates `errors` directly owns the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredValidationResult")]
pub struct ValidationResult {
    pub is_compliant: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub satisfied_requirements: BTreeSet<String>,
    pub validated_at: DateTime<Utc>,
}

/// Wire form of [`ValidationResult`]; `is_compliant` is accepted but ignored
#[derive(Deserialize)]
struct StoredValidationResult {
    #[serde(default, rename = "is_compliant")]
    _is_compliant: Option<bool>,
    #[serde(default)]
    errors: Vec<ValidationIssue>,
    #[serde(default)]
    warnings: Vec<ValidationIssue>,
    #[serde(default)]
    satisfied_requirements: BTreeSet<String>,
    validated_at: DateTime<Utc>,
}

impl From<StoredValidationResult> for ValidationResult {
    fn from(stored: StoredValidationResult) -> Self {
        Self {
            is_compliant: stored.errors.is_empty(),
            errors: stored.errors,
            warnings: stored.warnings,
            satisfied_requirements: stored.satisfied_requirements,
            validated_at: stored.validated_at,
        }
    }
}

impl ValidationResult {
    fn new() -> Self {
        Self {
            is_compliant: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            satisfied_requirements: BTreeSet::new(),
            validated_at: Utc::now(),
        }
    }

    fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.is_compliant = false;
    }

    fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    fn satisfy(&mut self, requirement: impl Into<String>) {
        self.satisfied_requirements.insert(requirement.into());
    }

    /// Field paths of all errors, in report order
    pub fn error_fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Validator for claim records
///
/// # Examples
///
/// ```rust
/// use domain_claims::{ClaimRecord, ClaimValidator};
/// use serde_json::json;
///
/// let claim = ClaimRecord::from_value(json!({ "status": "active" })).unwrap();
/// let result = ClaimValidator::validate(&claim);
///
/// assert!(!result.is_compliant);
/// assert_eq!(result.error_fields()[0], "identifier");
/// ```
pub struct ClaimValidator;

impl ClaimValidator {
    /// Runs every rule and collects all findings
    pub fn validate(claim: &ClaimRecord) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_required_fields(claim, &mut result);
        Self::validate_identifier_systems(claim, &mut result);
        Self::validate_patient_identifier(claim, &mut result);

        result
    }

    fn validate_required_fields(claim: &ClaimRecord, result: &mut ValidationResult) {
        for field in ClaimField::REQUIRED {
            if claim.has(field) {
                result.satisfy(format!("{} present", field));
            } else {
                result.add_error(ValidationIssue::error(
                    field.as_str(),
                    format!("Required NPHIES field '{}' is missing", field),
                    format!("الحقل المطلوب '{}' مفقود في نظام نفيس", field),
                ));
            }
        }
    }

    fn validate_identifier_systems(claim: &ClaimRecord, result: &mut ValidationResult) {
        for identifier in claim.identifiers() {
            if identifier.system.as_deref() == Some(NPHIES_IDENTIFIER_SYSTEM) {
                result.satisfy(NPHIES_IDENTIFIER_PRESENT);
            } else {
                result.add_warning(ValidationIssue::warning(
                    "identifier.system",
                    format!("NPHIES identifier system should be '{}'", NPHIES_IDENTIFIER_SYSTEM),
                    format!("نظام التعريف يجب أن يكون '{}'", NPHIES_IDENTIFIER_SYSTEM),
                ));
            }
        }
    }

    fn validate_patient_identifier(claim: &ClaimRecord, result: &mut ValidationResult) {
        if !claim.has(ClaimField::Patient) {
            return;
        }

        if !validate_national_id(&claim.patient_reference()) {
            result.add_error(ValidationIssue::error(
                "patient.identifier",
                "Invalid Saudi national ID format".to_string(),
                "تنسيق رقم الهوية الوطنية السعودية غير صالح".to_string(),
            ));
        }
    }
}
