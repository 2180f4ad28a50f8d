//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for claims, national IDs and audit keys.
//! These fixtures are designed to be consistent and predictable for unit tests.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use domain_claims::{ClaimRecord, NPHIES_IDENTIFIER_SYSTEM};
use infra_audit::{AuditKey, XChaChaAuditCipher};

/// Fixed key so that separately built ciphers can read each other's output
static FIXED_AUDIT_KEY: Lazy<AuditKey> = Lazy::new(|| AuditKey::from_bytes([0x5A; 32]));

/// Fixture for national ID test data
pub struct NationalIdFixtures;

impl NationalIdFixtures {
    /// Valid ID used throughout the suite (Luhn sum 50)
    pub fn valid() -> &'static str {
        "1234567897"
    }

    /// Further valid IDs with different leading digits
    pub fn valid_alternatives() -> [&'static str; 2] {
        ["2000000006", "1000000008"]
    }

    /// Correct shape, wrong check digit
    pub fn bad_checksum() -> &'static str {
        "1234567890"
    }

    /// Too short to be a national ID
    pub fn too_short() -> &'static str {
        "12345"
    }

    /// Ten characters, not all digits
    pub fn not_numeric() -> &'static str {
        "12345abcde"
    }
}

/// Fixture for claim test data
pub struct ClaimFixtures;

impl ClaimFixtures {
    pub fn claim_id() -> &'static str {
        "claim-2024-0001"
    }

    /// A claim that passes every field rule
    pub fn compliant_json() -> Value {
        json!({
            "resourceType": "Claim",
            "id": Self::claim_id(),
            "identifier": [{ "system": NPHIES_IDENTIFIER_SYSTEM, "value": "REQ-2024-0001" }],
            "status": "active",
            "type": { "coding": [{ "system": "http://terminology.hl7.org/CodeSystem/claim-type", "code": "institutional" }] },
            "patient": { "reference": NationalIdFixtures::valid() },
            "provider": { "reference": "Organization/riyadh-general" },
            "priority": { "coding": [{ "code": "normal" }] },
            "procedure": [{ "sequence": 1, "procedureCodeableConcept": { "text": "Appendectomy" } }],
            "insurance": [{ "sequence": 1, "focal": true, "coverage": { "reference": "Coverage/cov-77" } }],
            "total": { "value": 1500.0, "currency": "SAR" }
        })
    }

    pub fn compliant() -> ClaimRecord {
        ClaimRecord::from_value(Self::compliant_json()).unwrap()
    }

    /// The compliant claim with a national ID that fails the checksum
    pub fn bad_patient_id() -> ClaimRecord {
        let mut value = Self::compliant_json();
        value["patient"] = json!({ "reference": NationalIdFixtures::bad_checksum() });
        ClaimRecord::from_value(value).unwrap()
    }
}

/// Fixture for audit encryption
pub struct AuditFixtures;

impl AuditFixtures {
    /// A fixed, process-wide key
    pub fn key() -> AuditKey {
        FIXED_AUDIT_KEY.clone()
    }

    /// Cipher over the fixed key
    pub fn cipher() -> Arc<XChaChaAuditCipher> {
        Arc::new(XChaChaAuditCipher::new(&FIXED_AUDIT_KEY))
    }
}
