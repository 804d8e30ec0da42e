//! Phone number canonicalization for Indian mobile numbers.

use crate::number::parse_spoken_phone;
use tracing::debug;
use vaani_foundation::Locale;

const COUNTRY_CODE: &str = "91";
const LOCAL_LEN: usize = 10;

/// Canonicalized phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    /// Local digits only (no country code, no trunk zero).
    pub digits: String,
    /// `+91`-prefixed form when valid, otherwise the bare digits.
    pub formatted: String,
    /// Exactly ten local digits with a mobile leading digit (6-9).
    pub is_valid: bool,
}

/// Extract, canonicalize, and validate a phone number from free-form
/// text. Local ten-digit mobiles gain the country code; numbers already
/// carrying `+91`/`91`/`0` prefixes are reduced to their local part
/// first, which makes the whole operation idempotent.
pub fn clean_and_format_phone(text: &str, locale: Locale) -> PhoneNumber {
    let digits = parse_spoken_phone(text, locale);

    let local: &str = if digits.len() == LOCAL_LEN + COUNTRY_CODE.len()
        && digits.starts_with(COUNTRY_CODE)
    {
        &digits[COUNTRY_CODE.len()..]
    } else if digits.len() == LOCAL_LEN + 1 && digits.starts_with('0') {
        // Trunk-dialled national format.
        &digits[1..]
    } else {
        &digits
    };

    let is_valid = local.len() == LOCAL_LEN && matches!(local.as_bytes().first(), Some(b'6'..=b'9'));
    if !is_valid {
        debug!(target: "parse", digits = %digits, "phone did not canonicalize to a valid mobile");
    }

    let formatted = if is_valid {
        format!("+{}{}", COUNTRY_CODE, local)
    } else {
        digits.clone()
    };

    PhoneNumber {
        digits: local.to_string(),
        formatted,
        is_valid,
    }
}
