//! National identifier checksum
//!
//! Saudi national IDs (citizens start with `1`) and residence IDs (residents
//! start with `2`) are ten decimal digits protected by a Luhn check digit.

/// Length of a national identifier
pub const NATIONAL_ID_LENGTH: usize = 10;

/// Validates a national identifier
///
/// Fails closed: returns `false` unless the input is exactly ten ASCII
/// digits starting with `1` or `2` and the Luhn checksum holds. The checksum
/// is never computed for malformed input.
///
/// # Examples
///
/// ```
/// use domain_claims::validate_national_id;
///
/// assert!(validate_national_id("1234567897"));
/// assert!(!validate_national_id("1234567890"));
/// assert!(!validate_national_id("3234567897"));
/// ```
pub fn validate_national_id(id: &str) -> bool {
    if !has_national_id_shape(id) {
        return false;
    }

    luhn_sum(id.bytes().rev().map(|b| b - b'0')) % 10 == 0
}

/// Computes the check digit that completes a nine-digit payload
///
/// Returns `None` if the payload is not exactly nine ASCII digits.
pub fn luhn_check_digit(payload: &str) -> Option<u8> {
    if payload.len() != NATIONAL_ID_LENGTH - 1 || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // With a zero check digit appended, the payload's digits shift one
    // position left, so the sum is computed as if the check digit were 0.
    let digits = std::iter::once(0).chain(payload.bytes().rev().map(|b| b - b'0'));
    let sum = luhn_sum(digits);
    Some(((10 - sum % 10) % 10) as u8)
}

fn has_national_id_shape(id: &str) -> bool {
    id.len() == NATIONAL_ID_LENGTH
        && id.bytes().all(|b| b.is_ascii_digit())
        && matches!(id.as_bytes()[0], b'1' | b'2')
}

/// Luhn sum over digits ordered rightmost first
fn luhn_sum(digits_from_right: impl Iterator<Item = u8>) -> u32 {
    digits_from_right
        .enumerate()
        .map(|(index, digit)| {
            let digit = u32::from(digit);
            if index % 2 == 0 {
                digit
            } else {
                let doubled = digit * 2;
                doubled / 10 + doubled % 10
            }
        })
        .sum()
}
