//! Locale-keyed word tables.
//!
//! Hindi carries an irregular name for every number up to 100, so the
//! table is enumerated in full rather than composed. The Hindi table also
//! carries Devanagari transliterations of the English digit words,
//! since recognition engines emit those for speakers who mix languages.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use vaani_foundation::Locale;

#[rustfmt::skip]
const HI_NUMBER_WORDS: &[(&str, u8)] = &[
    ("शून्य", 0), ("एक", 1), ("दो", 2), ("तीन", 3), ("चार", 4),
    ("पाँच", 5), ("पांच", 5), ("छह", 6), ("छः", 6), ("छे", 6),
    ("सात", 7), ("आठ", 8), ("नौ", 9), ("दस", 10),
    ("ग्यारह", 11), ("बारह", 12), ("तेरह", 13), ("चौदह", 14), ("पंद्रह", 15),
    ("सोलह", 16), ("सत्रह", 17), ("अठारह", 18), ("उन्नीस", 19), ("बीस", 20),
    ("इक्कीस", 21), ("बाईस", 22), ("तेईस", 23), ("चौबीस", 24), ("पच्चीस", 25),
    ("छब्बीस", 26), ("सत्ताईस", 27), ("अट्ठाईस", 28), ("उनतीस", 29), ("तीस", 30),
    ("इकतीस", 31), ("बत्तीस", 32), ("तैंतीस", 33), ("चौंतीस", 34), ("पैंतीस", 35),
    ("छत्तीस", 36), ("सैंतीस", 37), ("अड़तीस", 38), ("उनतालीस", 39), ("चालीस", 40),
    ("इकतालीस", 41), ("बयालीस", 42), ("तैंतालीस", 43), ("चवालीस", 44), ("पैंतालीस", 45),
    ("छियालीस", 46), ("सैंतालीस", 47), ("अड़तालीस", 48), ("उनचास", 49), ("पचास", 50),
    ("इक्यावन", 51), ("बावन", 52), ("तिरपन", 53), ("चौवन", 54), ("पचपन", 55),
    ("छप्पन", 56), ("सत्तावन", 57), ("अट्ठावन", 58), ("उनसठ", 59), ("साठ", 60),
    ("इकसठ", 61), ("बासठ", 62), ("तिरसठ", 63), ("चौंसठ", 64), ("पैंसठ", 65),
    ("छियासठ", 66), ("सड़सठ", 67), ("अड़सठ", 68), ("उनहत्तर", 69), ("सत्तर", 70),
    ("इकहत्तर", 71), ("बहत्तर", 72), ("तिहत्तर", 73), ("चौहत्तर", 74), ("पचहत्तर", 75),
    ("छिहत्तर", 76), ("सतहत्तर", 77), ("अठहत्तर", 78), ("उन्यासी", 79), ("अस्सी", 80),
    ("इक्यासी", 81), ("बयासी", 82), ("तिरासी", 83), ("चौरासी", 84), ("पचासी", 85),
    ("छियासी", 86), ("सत्तासी", 87), ("अट्ठासी", 88), ("नवासी", 89), ("नब्बे", 90),
    ("इक्यानवे", 91), ("बानवे", 92), ("तिरानवे", 93), ("चौरानवे", 94), ("पंचानवे", 95),
    ("छियानवे", 96), ("सत्तानवे", 97), ("अट्ठानवे", 98), ("निन्यानवे", 99), ("सौ", 100),
    // English digit loanwords as a Hindi recognizer writes them
    ("ज़ीरो", 0), ("जीरो", 0), ("वन", 1), ("टू", 2), ("थ्री", 3),
    ("फोर", 4), ("फ़ोर", 4), ("फाइव", 5), ("फ़ाइव", 5), ("सिक्स", 6),
    ("सेवन", 7), ("एट", 8), ("नाइन", 9),
];

#[rustfmt::skip]
const EN_NUMBER_WORDS: &[(&str, u8)] = &[
    ("zero", 0), ("oh", 0), ("one", 1), ("two", 2), ("three", 3),
    ("four", 4), ("five", 5), ("six", 6), ("seven", 7), ("eight", 8),
    ("nine", 9), ("ten", 10), ("eleven", 11), ("twelve", 12),
    ("thirteen", 13), ("fourteen", 14), ("fifteen", 15), ("sixteen", 16),
    ("seventeen", 17), ("eighteen", 18), ("nineteen", 19), ("twenty", 20),
    ("thirty", 30), ("forty", 40), ("fifty", 50), ("sixty", 60),
    ("seventy", 70), ("eighty", 80), ("ninety", 90), ("hundred", 100),
];

static HI_NUMBERS: Lazy<HashMap<&'static str, u8>> =
    Lazy::new(|| HI_NUMBER_WORDS.iter().copied().collect());
static EN_NUMBERS: Lazy<HashMap<&'static str, u8>> =
    Lazy::new(|| EN_NUMBER_WORDS.iter().copied().collect());

pub(crate) fn number_words(locale: Locale) -> &'static HashMap<&'static str, u8> {
    match locale {
        Locale::Hi => &HI_NUMBERS,
        Locale::En => &EN_NUMBERS,
    }
}

/// Negative keywords are matched before affirmative ones: polite Hindi
/// refusals ("जी नहीं") contain an affirmative particle.
pub(crate) fn negative_words(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Hi => &["नहीं", "नही", "ना", "मत", "रहने"],
        Locale::En => &["no", "nope", "nah", "not", "cancel", "wrong"],
    }
}

pub(crate) fn affirmative_words(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Hi => &["हाँ", "हां", "जी", "ठीक", "सही", "बिल्कुल", "हो"],
        Locale::En => &["yes", "yeah", "yep", "sure", "ok", "okay", "right", "correct"],
    }
}

/// Day parts with their representative hour (24h).
pub(crate) fn day_parts(locale: Locale) -> &'static [(&'static str, u8)] {
    match locale {
        Locale::Hi => &[
            ("सुबह", 8),
            ("भोर", 8),
            ("दोपहर", 13),
            ("शाम", 18),
            ("रात", 21),
        ],
        Locale::En => &[
            ("morning", 8),
            ("afternoon", 13),
            ("evening", 18),
            ("night", 21),
        ],
    }
}

/// Keywords that shift a spoken clock hour into the afternoon/evening.
pub(crate) fn pm_markers(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Hi => &["pm", "दोपहर", "शाम", "रात"],
        Locale::En => &["pm", "afternoon", "evening", "night"],
    }
}

pub(crate) fn am_markers(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Hi => &["am", "सुबह", "भोर"],
        Locale::En => &["am", "morning"],
    }
}

/// Localized day-part label for a 24h hour, used when rendering a
/// recognized time back to the user.
pub(crate) fn day_part_label(locale: Locale, hour: u8) -> &'static str {
    match locale {
        Locale::Hi => match hour {
            4..=11 => "सुबह",
            12..=16 => "दोपहर",
            17..=20 => "शाम",
            _ => "रात",
        },
        Locale::En => match hour {
            4..=11 => "morning",
            12..=16 => "afternoon",
            17..=20 => "evening",
            _ => "night",
        },
    }
}
