//! Comprehensive tests for domain_claims

use proptest::prelude::*;
use serde_json::{json, Value};

use domain_claims::{
    luhn_check_digit, validate_national_id, ClaimField, ClaimRecord, ClaimValidator, Severity,
    NPHIES_IDENTIFIER_SYSTEM,
};

fn compliant_claim_value() -> Value {
    json!({
        "resourceType": "Claim",
        "id": "claim-2024-0001",
        "identifier": [{ "system": NPHIES_IDENTIFIER_SYSTEM, "value": "REQ-2024-0001" }],
        "status": "active",
        "type": { "coding": [{ "system": "http://terminology.hl7.org/CodeSystem/claim-type", "code": "professional" }] },
        "patient": { "reference": "1234567897" },
        "provider": { "reference": "Organization/10000000000988" },
        "priority": { "coding": [{ "code": "normal" }] },
        "procedure": [{ "sequence": 1, "procedureCodeableConcept": { "text": "Consultation" } }],
        "insurance": [{ "sequence": 1, "focal": true, "coverage": { "reference": "Coverage/cov-1" } }],
        "total": { "value": 350.0, "currency": "SAR" }
    })
}

fn without(field: ClaimField) -> ClaimRecord {
    let mut value = compliant_claim_value();
    value.as_object_mut().unwrap().remove(field.as_str());
    ClaimRecord::from_value(value).unwrap()
}

/// Straightforward Luhn used as the oracle for the property tests
fn reference_luhn(id: &str) -> bool {
    let digits: Vec<u32> = id.chars().map(|c| c.to_digit(10).unwrap()).collect();
    let mut total = 0;
    for (position, digit) in digits.iter().rev().enumerate() {
        if position % 2 == 1 {
            let doubled = digit * 2;
            total += if doubled > 9 { doubled - 9 } else { doubled };
        } else {
            total += digit;
        }
    }
    total % 10 == 0
}

// ============================================================================
// National ID Tests
// ============================================================================

mod national_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_wrong_leading_digit_rejected(lead in "[03-9]", rest in "[0-9]{9}") {
            let id = format!("{}{}", lead, rest);
            prop_assert!(!validate_national_id(&id));
        }

        #[test]
        fn prop_non_digit_rejected(prefix in "[12][0-9]{0,8}", junk in "[a-zA-Z -]") {
            let mut id = format!("{}{}", prefix, junk);
            while id.len() < 10 {
                id.push('0');
            }
            prop_assert!(!validate_national_id(&id));
        }

        #[test]
        fn prop_wrong_length_rejected(id in "[12][0-9]{0,8}|[12][0-9]{10,14}") {
            prop_assert!(!validate_national_id(&id));
        }

        #[test]
        fn prop_agrees_with_reference_luhn(id in "[12][0-9]{9}") {
            prop_assert_eq!(validate_national_id(&id), reference_luhn(&id));
            // Deterministic
            prop_assert_eq!(validate_national_id(&id), validate_national_id(&id));
        }

        #[test]
        fn prop_check_digit_completes_payload(payload in "[12][0-9]{8}") {
            let digit = luhn_check_digit(&payload).unwrap();
            let id = format!("{}{}", payload, digit);
            prop_assert!(validate_national_id(&id));
        }
    }

    #[test]
    fn test_single_digit_change_breaks_checksum() {
        assert!(validate_national_id("1234567897"));
        assert!(!validate_national_id("1234567898"));
        assert!(!validate_national_id("1234567887"));
    }
}

// ============================================================================
// Field Rule Engine Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_compliant_claim_has_no_errors() {
        let claim = ClaimRecord::from_value(compliant_claim_value()).unwrap();
        let result = ClaimValidator::validate(&claim);

        assert!(result.is_compliant);
        assert!(result.errors.is_empty());
        assert_eq!(result.is_compliant, result.errors.is_empty());
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for field in ClaimField::REQUIRED {
            let result = ClaimValidator::validate(&without(field));

            assert!(!result.is_compliant, "missing {} should not be compliant", field);
            assert_eq!(result.errors.len(), 1, "missing {}", field);
            assert_eq!(result.errors[0].field, field.as_str());
            assert_eq!(result.errors[0].severity, Severity::Error);
            assert!(result.errors[0].message.contains(field.as_str()));
            assert!(result.errors[0].localized_message.contains(field.as_str()));
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut value = compliant_claim_value();
        value["insurance"] = Value::Null;
        let result = ClaimValidator::validate(&ClaimRecord::from_value(value).unwrap());

        assert_eq!(result.error_fields(), vec!["insurance"]);
    }

    proptest! {
        #[test]
        fn prop_errors_follow_declaration_order(mask in proptest::collection::vec(any::<bool>(), 9)) {
            let mut value = compliant_claim_value();
            let object = value.as_object_mut().unwrap();
            let mut expected = Vec::new();
            for (field, drop) in ClaimField::REQUIRED.iter().zip(&mask) {
                if *drop {
                    object.remove(field.as_str());
                    expected.push(field.as_str());
                }
            }

            let result = ClaimValidator::validate(&ClaimRecord::from_value(value).unwrap());

            prop_assert_eq!(result.error_fields(), expected.clone());
            prop_assert_eq!(result.is_compliant, expected.is_empty());
        }
    }

    #[test]
    fn test_invalid_patient_after_required_errors() {
        let mut value = compliant_claim_value();
        value.as_object_mut().unwrap().remove("total");
        value["patient"] = json!({ "reference": "9999999999" });

        let result = ClaimValidator::validate(&ClaimRecord::from_value(value).unwrap());

        assert_eq!(result.error_fields(), vec!["total", "patient.identifier"]);
    }

    #[test]
    fn test_resource_typed_patient_reference_is_rejected() {
        let mut value = compliant_claim_value();
        value["patient"] = json!({ "reference": "Patient/1234567897" });

        let result = ClaimValidator::validate(&ClaimRecord::from_value(value).unwrap());

        assert!(!result.is_compliant);
        assert_eq!(result.error_fields(), vec!["patient.identifier"]);
    }

    #[test]
    fn test_mixed_identifier_systems() {
        let mut value = compliant_claim_value();
        value["identifier"] = json!([
            { "system": NPHIES_IDENTIFIER_SYSTEM, "value": "A" },
            { "system": "https://legacy.example", "value": "B" },
            { "value": "C" }
        ]);

        let result = ClaimValidator::validate(&ClaimRecord::from_value(value).unwrap());

        assert!(result.is_compliant);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.satisfied_requirements.contains("NPHIES identifier present"));
    }

    #[test]
    fn test_result_serializes_with_all_sections() {
        let result = ClaimValidator::validate(&without(ClaimField::Provider));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["is_compliant"], false);
        assert_eq!(json["errors"][0]["field"], "provider");
        assert_eq!(json["errors"][0]["severity"], "error");
        assert!(json["warnings"].is_array());
        assert!(json["satisfied_requirements"].is_array());
    }
}
