//! Scripted providers.
//!
//! Deterministic stand-ins for vendor recognition/synthesis SDKs, used by
//! the test suites and by the demo binary. A [`ScriptedRecognizer`]
//! replays one list of timed events per listen cycle; a
//! [`ScriptedSynthesizer`] "plays" for a fixed latency and records what
//! it was asked to say.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use vaani_foundation::{Locale, VoiceError};

use crate::provider::{RecognitionEvent, RecognitionProvider, SynthesisOutcome, SynthesisProvider};

static UTTERANCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_utterance_id() -> u64 {
    UTTERANCE_ID.fetch_add(1, Ordering::SeqCst)
}

/// One scheduled recognition event within a scripted cycle.
#[derive(Debug, Clone)]
pub struct TimedEvent {
    /// Delay after the previous event (or after cycle start).
    pub after: Duration,
    pub event: RecognitionEvent,
}

/// A finalized segment `after_ms` into the cycle.
pub fn final_after(after_ms: u64, text: &str) -> TimedEvent {
    TimedEvent {
        after: Duration::from_millis(after_ms),
        event: RecognitionEvent::Final {
            utterance_id: next_utterance_id(),
            text: text.to_string(),
        },
    }
}

/// An interim hypothesis `after_ms` into the cycle.
pub fn partial_after(after_ms: u64, text: &str) -> TimedEvent {
    TimedEvent {
        after: Duration::from_millis(after_ms),
        event: RecognitionEvent::Partial {
            utterance_id: next_utterance_id(),
            text: text.to_string(),
        },
    }
}

/// A provider error `after_ms` into the cycle.
pub fn error_after(after_ms: u64, message: &str) -> TimedEvent {
    TimedEvent {
        after: Duration::from_millis(after_ms),
        event: RecognitionEvent::Error {
            code: "scripted".to_string(),
            message: message.to_string(),
        },
    }
}

/// Recognition provider that replays a canned script.
///
/// Each call to `start_continuous` consumes the next scripted cycle.
/// After a cycle's events are exhausted the stream stays open (silent)
/// until `stop`, so timeout behavior matches a real engine.
pub struct ScriptedRecognizer {
    available: bool,
    cycles: Mutex<VecDeque<Vec<TimedEvent>>>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    cycles_started: AtomicU64,
}

impl ScriptedRecognizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: true,
            cycles: Mutex::new(VecDeque::new()),
            cancel: Mutex::new(None),
            cycles_started: AtomicU64::new(0),
        })
    }

    /// A recognizer that reports no engine present.
    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            cycles: Mutex::new(VecDeque::new()),
            cancel: Mutex::new(None),
            cycles_started: AtomicU64::new(0),
        })
    }

    /// Queue the event list for the next listen cycle.
    pub fn push_cycle(&self, events: Vec<TimedEvent>) {
        self.cycles.lock().push_back(events);
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecognitionProvider for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn start_continuous(
        &self,
        locale: Locale,
    ) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
        if !self.available {
            return Err(VoiceError::Unsupported("scripted engine disabled".into()));
        }
        self.cycles_started.fetch_add(1, Ordering::SeqCst);
        let script = self.cycles.lock().pop_front().unwrap_or_default();
        debug!(target: "mock", events = script.len(), locale = %locale, "scripted cycle started");

        let (tx, rx) = mpsc::channel(32);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        *self.cancel.lock() = Some(cancel_tx);

        tokio::spawn(async move {
            for item in script {
                tokio::select! {
                    _ = tokio::time::sleep(item.after) => {
                        if tx.send(item.event).await.is_err() {
                            return;
                        }
                    }
                    _ = &mut cancel_rx => return,
                }
            }
            // Hold the stream open until stopped.
            let _ = cancel_rx.await;
        });
        Ok(rx)
    }

    fn stop(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            let _ = cancel.send(());
        }
    }
}

/// Synthesis provider with fixed playback latency.
pub struct ScriptedSynthesizer {
    latency: Duration,
    outcomes: Mutex<VecDeque<SynthesisOutcome>>,
    spoken: Mutex<Vec<String>>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    cancelled: AtomicU64,
}

impl ScriptedSynthesizer {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            outcomes: Mutex::new(VecDeque::new()),
            spoken: Mutex::new(Vec::new()),
            cancel: Mutex::new(None),
            cancelled: AtomicU64::new(0),
        })
    }

    /// Queue a non-default outcome for an upcoming request.
    pub fn push_outcome(&self, outcome: SynthesisOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    /// Every text this synthesizer was asked to play, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisProvider for ScriptedSynthesizer {
    async fn speak(&self, text: &str, _locale: Locale, _rate: f32) -> SynthesisOutcome {
        self.spoken.lock().push(text.to_string());
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        *self.cancel.lock() = Some(cancel_tx);
        tokio::select! {
            _ = tokio::time::sleep(self.latency) => {}
            // Cancelled synthesis still resolves; callers only ever see
            // "done speaking".
            _ = cancel_rx => {}
        }
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or(SynthesisOutcome::Completed)
    }

    fn cancel(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
            let _ = cancel.send(());
        }
    }
}
