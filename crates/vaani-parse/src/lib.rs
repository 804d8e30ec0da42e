//! Spoken number and intent parsers.
//!
//! Every function in this crate is pure and total: free-form spoken or
//! typed text goes in, a best-effort value or an explicit "not
//! recognized" sentinel comes out. Nothing here panics or returns `Err`:
//! these run inside a live conversational loop where an escaped error
//! would corrupt turn-taking state.
//!
//! Dictionary lookups consult the active locale's table first and fall
//! back to [`Locale::FALLBACK`].

mod dict;
mod intent;
mod number;
mod phone;

pub use intent::{parse_spoken_time_of_day, parse_yes_no, Affirmation, TimeOfDay};
pub use number::{is_plausible_age, parse_spoken_age, parse_spoken_number, parse_spoken_phone};
pub use phone::{clean_and_format_phone, PhoneNumber};

pub use vaani_foundation::Locale;

/// Normalize one codepoint of input: Devanagari digits become ASCII,
/// ASCII letters are lowercased.
pub(crate) fn normalize_char(c: char) -> char {
    match c {
        '\u{0966}'..='\u{096F}' => {
            // ० .. ९
            char::from(b'0' + (c as u32 - 0x0966) as u8)
        }
        _ => c.to_ascii_lowercase(),
    }
}

/// Tokenize on whitespace and punctuation. Splits only on whitespace,
/// ASCII punctuation, and the Devanagari danda so that conjuncts, matras,
/// and nukta-bearing letters stay inside one token.
pub(crate) fn tokens(text: &str) -> Vec<String> {
    text.chars()
        .map(normalize_char)
        .collect::<String>()
        .split(|c: char| {
            c.is_whitespace() || (c.is_ascii() && !c.is_ascii_alphanumeric()) || c == '।' || c == '॥'
        })
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
