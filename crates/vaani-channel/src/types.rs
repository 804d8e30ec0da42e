//! Channel state and event types.

use std::time::Duration;
use vaani_foundation::{Locale, VoiceError};

/// Mutable channel state, owned exclusively by the channel.
///
/// `listening` and `speaking` are never simultaneously true;
/// `processing_cooldown` is raised only for the airlock window after a
/// context switch and blocks `listening` from becoming true.
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    pub listening: bool,
    pub speaking: bool,
    pub processing_cooldown: bool,
    pub transcript_buffer: String,
    pub last_error: Option<VoiceError>,
}

/// Why a listen cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user paused for the policy's silence window.
    Silence,
    /// Zero recognition events arrived for the whole no-speech window.
    NoSpeech,
    /// `stop_listening` was called.
    Manual,
    /// The recognition provider failed or closed its stream.
    ProviderError,
    /// A route/flow change reset the channel.
    ContextSwitch,
}

/// Events pushed to channel subscribers.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    ListeningStarted,
    ListeningStopped {
        reason: StopReason,
    },
    /// Fired on every recognition result. `committed` is the buffer
    /// content; `preview` additionally carries uncommitted interim text
    /// so a caller can render "heard so far".
    TranscriptUpdated {
        committed: String,
        preview: String,
    },
    SpeakingStarted,
    SpeakingFinished,
    ContextSwitched,
    CooldownCleared,
}

/// Options for one `speak` call.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    /// Speaking-rate override (1.0 is the provider default).
    pub rate: Option<f32>,
}

/// How a `speak` call resolved. Never an error: blocked or failed
/// synthesis resolves so callers only ever see "done speaking".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    Completed,
    /// Platform autoplay/permission policy refused playback.
    Blocked,
    /// The provider reported an error; already logged.
    Failed,
    /// Empty text, nothing to do.
    Skipped,
}

/// Channel construction parameters.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub locale: Locale,
    /// Airlock window after a context switch during which listening is
    /// blocked.
    pub cooldown_ms: u64,
    /// Broadcast capacity for channel events.
    pub event_capacity: usize,
}

impl ChannelConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            cooldown_ms: 750,
            event_capacity: 64,
        }
    }
}

/// Channel counters.
#[derive(Debug, Clone, Default)]
pub struct ChannelMetrics {
    /// Listen cycles started.
    pub listen_cycles: u64,
    /// No-speech windows that elapsed.
    pub no_speech_timeouts: u64,
    /// Silence windows that elapsed.
    pub silence_timeouts: u64,
    /// Finalized segments merged into the buffer.
    pub segments_merged: u64,
    /// Recognition provider errors.
    pub provider_errors: u64,
    /// Synthesis requests accepted.
    pub synth_requests: u64,
}
