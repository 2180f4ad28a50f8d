//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for validation results and audit
//! trails that give more meaningful error messages than standard assertions.

use domain_claims::{Severity, ValidationResult};
use infra_audit::DecryptedAuditEntry;

/// Asserts that a validation result is compliant
///
/// # Panics
///
/// Panics listing every error when the result is not compliant
pub fn assert_compliant(result: &ValidationResult) {
    assert!(
        result.is_compliant,
        "Expected compliant claim, got errors: {:?}",
        result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
    );
    assert!(result.errors.is_empty());
}

/// Asserts that a validation result reports exactly these error fields, in order
pub fn assert_error_fields(result: &ValidationResult, expected: &[&str]) {
    assert!(!result.is_compliant, "Expected non-compliant claim");
    assert_eq!(
        result.error_fields(),
        expected,
        "Error fields differ from expectation"
    );
    assert!(
        result.errors.iter().all(|e| e.severity == Severity::Error),
        "Every reported error must carry error severity"
    );
}

/// Asserts that every issue carries an Arabic message alongside the English one
pub fn assert_bilingual(result: &ValidationResult) {
    for issue in result.errors.iter().chain(&result.warnings) {
        assert!(
            !issue.localized_message.is_empty() && issue.localized_message != issue.message,
            "Issue for '{}' lacks a localized message",
            issue.field
        );
    }
}

/// Asserts that the audit trail holds exactly these actions, in order
pub fn assert_audit_actions(entries: &[DecryptedAuditEntry], expected: &[&str]) {
    let actual: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actual, expected, "Audit actions differ from expectation");
}

/// Asserts that no raw audit line contains the given plaintext
pub fn assert_no_plaintext(lines: &[String], plaintext: &str) {
    for (index, line) in lines.iter().enumerate() {
        assert!(
            !line.contains(plaintext),
            "Audit line {} leaks plaintext '{}'",
            index + 1,
            plaintext
        );
    }
}
