use serde::{Deserialize, Serialize};

/// Supported prompt/recognition locales.
///
/// Lookups that miss in the active locale's table fall back to
/// [`Locale::FALLBACK`] (English); there is no dynamic locale discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Hindi (Devanagari script, primary audience).
    Hi,
    /// English (also the fallback dictionary).
    En,
}

impl Locale {
    /// Fallback table consulted when the active locale has no entry.
    pub const FALLBACK: Locale = Locale::En;

    /// BCP-47 tag handed to recognition/synthesis providers.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::Hi => "hi-IN",
            Locale::En => "en-IN",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Hi
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
