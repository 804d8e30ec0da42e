use thiserror::Error;

/// Error taxonomy for the voice stack.
///
/// Most of these are expected conversational outcomes rather than faults:
/// a failed validation re-prompts the user, an elapsed timer submits
/// whatever was heard. Only `Unsupported` is permanent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// The platform lacks a speech capability. Surfaced once, at channel
    /// construction, so the host can offer a text-only path.
    #[error("speech capability unsupported: {0}")]
    Unsupported(String),

    /// The recognition provider failed mid-listen.
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),

    /// User input did not parse or did not pass the step's business rules.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// A no-speech or silence window elapsed.
    #[error("timed out waiting for speech ({0})")]
    Timeout(TimeoutKind),

    /// Platform autoplay/permission policy refused synthesis. Flows
    /// continue without audio rather than stalling.
    #[error("synthesis blocked by platform policy")]
    SynthesisBlocked,
}

/// Which listen timer elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// Zero recognition events arrived for the whole window.
    NoSpeech,
    /// The user paused after speaking.
    Silence,
}

impl std::fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutKind::NoSpeech => write!(f, "no-speech"),
            TimeoutKind::Silence => write!(f, "silence"),
        }
    }
}

/// How a failure should be treated by the layer that observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Cannot recover; host should switch to a non-voice path.
    Permanent,
    /// Per-attempt failure; the flow decides whether to retry.
    Transient,
    /// Part of normal turn-taking; handled by the retry loop, never
    /// logged as an application error.
    Expected,
}

impl VoiceError {
    pub fn disposition(&self) -> Disposition {
        match self {
            VoiceError::Unsupported(_) => Disposition::Permanent,
            VoiceError::RecognitionFailed(_) => Disposition::Transient,
            VoiceError::ValidationFailed(_)
            | VoiceError::Timeout(_)
            | VoiceError::SynthesisBlocked => Disposition::Expected,
        }
    }
}
