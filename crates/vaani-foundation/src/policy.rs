use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Listen-cycle timing for one flow context.
///
/// Selected when a listen cycle starts and never mutated mid-listen. The
/// no-speech window governs until the first recognition event arrives;
/// after that only the silence window is re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    /// Force-stop after this long without a recognition event, once at
    /// least one event has arrived.
    pub silence_timeout_ms: u64,
    /// Force-stop if zero recognition events arrive within this window.
    pub no_speech_timeout_ms: u64,
}

impl TimeoutPolicy {
    /// Long-form capture for registration-style flows. Elderly speakers
    /// pause between digits; the silence window has to absorb that.
    pub fn elder_friendly() -> Self {
        Self {
            silence_timeout_ms: 5_000,
            no_speech_timeout_ms: 12_000,
        }
    }

    /// Short in-app commands that must feel instant.
    pub fn quick_command() -> Self {
        Self {
            silence_timeout_ms: 1_500,
            no_speech_timeout_ms: 6_000,
        }
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn no_speech_timeout(&self) -> Duration {
        Duration::from_millis(self.no_speech_timeout_ms)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::elder_friendly()
    }
}

/// How finalized recognition segments are merged within one listen cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    /// Concatenate every finalized segment. Needed for phone numbers
    /// spoken digit-by-digit across several utterances.
    Accumulate,
    /// Keep only the latest finalized segment. Right for short commands.
    Replace,
}
