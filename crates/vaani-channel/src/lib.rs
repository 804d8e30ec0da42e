//! Half-duplex speech channel.
//!
//! [`SpeechChannel`] is the sole owner of audio I/O intent: every caller
//! goes through it rather than touching recognition or synthesis
//! primitives directly. It enforces the listen/speak mutex, applies
//! per-context silence and no-speech timeouts, and guards every timer
//! with a listen-cycle generation so a stale fire is a no-op.

pub mod channel;
pub mod mock;
pub mod provider;
pub mod types;

pub use channel::SpeechChannel;
pub use provider::{
    RecognitionEvent, RecognitionProvider, SynthesisOutcome, SynthesisProvider,
};
pub use types::{
    ChannelConfig, ChannelEvent, ChannelMetrics, ChannelState, SpeakOptions, SpeakOutcome,
    StopReason,
};
