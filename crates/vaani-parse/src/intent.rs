//! Yes/no and time-of-day intent matching.

use crate::{dict, tokens};
use once_cell::sync::Lazy;
use regex::Regex;
use vaani_foundation::Locale;

/// Recognized yes/no intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affirmation {
    Yes,
    No,
}

/// Substring-match the utterance against the locale's keyword sets.
///
/// The negative set is consulted first (see `dict::negative_words`);
/// `None` means neither set matched and the caller decides the default;
/// flows treat silence and ambiguity as "no change".
pub fn parse_yes_no(text: &str, locale: Locale) -> Option<Affirmation> {
    let normalized: String = text.chars().map(crate::normalize_char).collect();

    for set in [
        (dict::negative_words(locale), Affirmation::No),
        (dict::negative_words(Locale::FALLBACK), Affirmation::No),
        (dict::affirmative_words(locale), Affirmation::Yes),
        (dict::affirmative_words(Locale::FALLBACK), Affirmation::Yes),
    ] {
        if set.0.iter().any(|kw| normalized.contains(kw)) {
            return Some(set.1);
        }
    }
    None
}

/// A recognized time-of-day slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfDay {
    /// 24-hour clock.
    pub hour: u8,
    /// Localized rendering, e.g. "सुबह 8 बजे" or "8 AM".
    pub display: String,
}

static CLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*(?:(am|pm)\b|बजे)?").expect("static pattern"));

/// Parse a spoken time of day.
///
/// An explicit numeric "N [am|pm|बजे]" pattern is tried first (spoken
/// number words count as N); day-part keywords alone fall back to fixed
/// representative hours. A bare hour below twelve reads as morning.
pub fn parse_spoken_time_of_day(text: &str, locale: Locale) -> Option<TimeOfDay> {
    let normalized: String = text.chars().map(crate::normalize_char).collect();

    let hour_token = find_hour(&normalized, locale);

    let has_pm = marker_present(&normalized, dict::pm_markers(locale))
        || marker_present(&normalized, dict::pm_markers(Locale::FALLBACK));
    let has_am = marker_present(&normalized, dict::am_markers(locale))
        || marker_present(&normalized, dict::am_markers(Locale::FALLBACK));

    if let Some(mut hour) = hour_token {
        if has_pm && hour < 12 {
            hour += 12;
        } else if has_am && hour == 12 {
            hour = 0;
        }
        return Some(render(hour, locale));
    }

    // No usable hour spoken; a day part alone maps to its representative hour.
    for (kw, hour) in dict::day_parts(locale)
        .iter()
        .chain(dict::day_parts(Locale::FALLBACK).iter())
    {
        if normalized.contains(kw) {
            return Some(render(*hour, locale));
        }
    }
    None
}

/// First token that reads as a clock hour, numeric or spelled out.
fn find_hour(normalized: &str, locale: Locale) -> Option<u8> {
    if let Some(caps) = CLOCK_PATTERN.captures(normalized) {
        if let Ok(h) = caps[1].parse::<u8>() {
            if h <= 23 {
                return Some(h);
            }
        }
    }
    for token in tokens(normalized) {
        let value = dict::number_words(locale)
            .get(token.as_str())
            .or_else(|| dict::number_words(Locale::FALLBACK).get(token.as_str()));
        if let Some(&v) = value {
            if v <= 23 {
                return Some(v);
            }
        }
    }
    None
}

fn marker_present(normalized: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| {
        if m.is_ascii() {
            // ASCII markers ("am"/"pm") must be standalone tokens;
            // substring matching would fire inside ordinary words.
            tokens(normalized).iter().any(|t| t == m)
        } else {
            normalized.contains(m)
        }
    })
}

fn render(hour: u8, locale: Locale) -> TimeOfDay {
    let h12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let display = match locale {
        Locale::Hi => format!("{} {} बजे", dict::day_part_label(locale, hour), h12),
        Locale::En => format!("{} {}", h12, if hour < 12 { "AM" } else { "PM" }),
    };
    TimeOfDay { hour, display }
}
