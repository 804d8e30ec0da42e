//! Provider traits the channel drives.
//!
//! Vendor STT/TTS SDKs live behind these two traits. Synthesis outcomes
//! all resolve: blocked playback and provider errors are values, not
//! `Err`, so the channel's `speak` never needs exception handling.

use async_trait::async_trait;
use tokio::sync::mpsc;
use vaani_foundation::{Locale, VoiceError};

/// One result from a continuous recognition stream.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Interim hypothesis for the utterance in progress.
    Partial { utterance_id: u64, text: String },
    /// Finalized segment.
    Final { utterance_id: u64, text: String },
    /// Provider-side failure.
    Error { code: String, message: String },
}

/// Continuous speech recognition.
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Whether a recognition engine is present at all. Checked once at
    /// channel construction.
    fn is_available(&self) -> bool;

    /// Begin continuous recognition; events arrive on the returned
    /// stream until [`stop`](Self::stop) is called.
    async fn start_continuous(
        &self,
        locale: Locale,
    ) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError>;

    /// Stop the active stream. Synchronous so a context switch can kill
    /// recognition before anything else runs. Idempotent.
    fn stop(&self);
}

/// How one synthesis request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Completed,
    /// Autoplay/permission policy refused playback.
    Blocked,
    Error(String),
}

/// Text-to-speech synthesis.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize and play `text`; resolves when playback ends, is
    /// blocked, or errors.
    async fn speak(&self, text: &str, locale: Locale, rate: f32) -> SynthesisOutcome;

    /// Cancel in-flight synthesis, resolving its `speak` future.
    /// Synchronous and idempotent.
    fn cancel(&self);
}
