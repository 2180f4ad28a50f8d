//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;

use domain_access::Role;
use domain_claims::{luhn_check_digit, ClaimField};

/// Strategy for 9-digit payloads
pub fn national_id_payload_strategy() -> impl Strategy<Value = String> {
    "[0-9]{9}"
}

/// Strategy for national IDs that pass the checksum
pub fn valid_national_id_strategy() -> impl Strategy<Value = String> {
    national_id_payload_strategy().prop_map(|payload| {
        let check = luhn_check_digit(&payload).unwrap();
        format!("{}{}", payload, check)
    })
}

/// Strategy for well-formed national IDs whose check digit is wrong
pub fn bad_checksum_national_id_strategy() -> impl Strategy<Value = String> {
    (national_id_payload_strategy(), 1u8..10).prop_map(|(payload, offset)| {
        let check = luhn_check_digit(&payload).unwrap();
        format!("{}{}", payload, (check + offset) % 10)
    })
}

/// Strategy for 10-character strings that contain a non-digit
pub fn non_numeric_national_id_strategy() -> impl Strategy<Value = String> {
    ("[0-9]{0,9}", "[A-Za-z /-]").prop_map(|(digits, bad)| {
        let mut id = digits;
        id.push_str(&bad);
        while id.chars().count() < 10 {
            id.push('0');
        }
        id
    })
}

/// Strategy for any role
pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Strategy for one required claim field
pub fn required_field_strategy() -> impl Strategy<Value = ClaimField> {
    prop::sample::select(ClaimField::REQUIRED.to_vec())
}
