//! Turn-based conversation engine.
//!
//! A [`Flow`] declares its dialog steps; the [`ConversationEngine`]
//! drives each one through prompt → listen → parse → validate →
//! confirm/retry against a shared [`vaani_channel::SpeechChannel`]. One
//! flow runs at a time; the engine holds no state across flows.

pub mod engine;
pub mod flow;

pub use engine::{ConversationEngine, FlowError, FlowReport};
pub use flow::{
    DialogStep, Flow, FlowOutcome, ParsedValue, ParserKind, PromptSource, RetryPolicy, StepOutcome,
    StepValue,
};
