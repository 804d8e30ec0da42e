//! Word-to-digit reconstruction for spoken numbers.

use crate::dict;
use crate::tokens;
use vaani_foundation::Locale;

/// Map free-form spoken/typed text to a digit string.
///
/// Tokens are looked up in the locale's word table (then the fallback
/// table); raw digit tokens pass through; everything unrecognized is
/// skipped so one filler word never aborts the parse.
///
/// "six five" → "65"; "आठ नौ" → "89"; "सौ" → "100".
pub fn parse_spoken_number(text: &str, locale: Locale) -> String {
    let mut digits = String::new();
    for token in tokens(text) {
        if token.chars().all(|c| c.is_ascii_digit()) {
            digits.push_str(&token);
            continue;
        }
        let value = dict::number_words(locale)
            .get(token.as_str())
            .or_else(|| dict::number_words(Locale::FALLBACK).get(token.as_str()));
        if let Some(v) = value {
            digits.push_str(&v.to_string());
        }
    }
    digits
}

/// Phone-number variant of [`parse_spoken_number`].
///
/// A transcript that already carries ten or more raw digits (the
/// recognizer often emits "9876543210" wholesale) wins over word-by-word
/// reconstruction; the result is digits-only either way.
pub fn parse_spoken_phone(text: &str, locale: Locale) -> String {
    let raw_digits: String = text
        .chars()
        .map(crate::normalize_char)
        .filter(|c| c.is_ascii_digit())
        .collect();
    if raw_digits.len() >= 10 {
        return raw_digits;
    }
    parse_spoken_number(text, locale)
}

/// Age is parsed like any spoken number; the plausibility bound is the
/// caller's validation step, not part of the parse.
pub fn parse_spoken_age(text: &str, locale: Locale) -> String {
    parse_spoken_number(text, locale)
}

/// Reasonable human age range, applied by step validators.
pub fn is_plausible_age(digits: &str) -> bool {
    match digits.parse::<u32>() {
        Ok(age) => (1..=120).contains(&age),
        Err(_) => false,
    }
}
