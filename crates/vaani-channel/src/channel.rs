//! The half-duplex speech channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use vaani_foundation::{TimeoutKind, TimeoutPolicy, TranscriptMode, VoiceError};

use crate::provider::{RecognitionEvent, RecognitionProvider, SynthesisOutcome, SynthesisProvider};
use crate::types::{
    ChannelConfig, ChannelEvent, ChannelMetrics, ChannelState, SpeakOptions, SpeakOutcome,
    StopReason,
};

/// Owner of the shared audio channel.
///
/// One listener or one speaker, never both. Every listen cycle, speak
/// request, and airlock window carries a generation number; an async
/// completion whose generation is stale is ignored, which is what makes
/// `on_context_switch` an authoritative cancellation point.
pub struct SpeechChannel {
    recognizer: Arc<dyn RecognitionProvider>,
    synthesizer: Arc<dyn SynthesisProvider>,
    config: ChannelConfig,
    state: Arc<RwLock<ChannelState>>,
    events: broadcast::Sender<ChannelEvent>,
    listen_gen: Arc<AtomicU64>,
    speak_gen: Arc<AtomicU64>,
    cooldown_gen: Arc<AtomicU64>,
    metrics: Arc<RwLock<ChannelMetrics>>,
}

impl SpeechChannel {
    /// Build a channel over the given providers.
    ///
    /// A missing recognition engine is the one permanent failure in the
    /// stack; it surfaces here, once, so the host can offer a text-only
    /// path instead.
    pub fn new(
        recognizer: Arc<dyn RecognitionProvider>,
        synthesizer: Arc<dyn SynthesisProvider>,
        config: ChannelConfig,
    ) -> Result<Self, VoiceError> {
        if !recognizer.is_available() {
            return Err(VoiceError::Unsupported(
                "no recognition engine present".into(),
            ));
        }
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            recognizer,
            synthesizer,
            config,
            state: Arc::new(RwLock::new(ChannelState::default())),
            events,
            listen_gen: Arc::new(AtomicU64::new(0)),
            speak_gen: Arc::new(AtomicU64::new(0)),
            cooldown_gen: Arc::new(AtomicU64::new(0)),
            metrics: Arc::new(RwLock::new(ChannelMetrics::default())),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    pub fn state_snapshot(&self) -> ChannelState {
        self.state.read().clone()
    }

    /// Committed transcript buffer for the current/most recent cycle.
    pub fn transcript(&self) -> String {
        self.state.read().transcript_buffer.clone()
    }

    pub fn metrics(&self) -> ChannelMetrics {
        self.metrics.read().clone()
    }

    /// Begin a listen cycle under the given policy and merge mode.
    ///
    /// A no-op (returns false, logged) while speaking or during the
    /// airlock cooldown: the mutex is enforced here, not at call sites.
    pub async fn start_listening(&self, policy: TimeoutPolicy, mode: TranscriptMode) -> bool {
        {
            let st = self.state.read();
            if st.speaking {
                debug!(target: "channel", "start_listening ignored: channel is speaking");
                return false;
            }
            if st.processing_cooldown {
                debug!(target: "channel", "start_listening ignored: airlock cooldown active");
                return false;
            }
            if st.listening {
                debug!(target: "channel", "start_listening ignored: already listening");
                return false;
            }
        }

        let generation = self.listen_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let rx = match self.recognizer.start_continuous(self.config.locale).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(target: "channel", error = %e, "recognition failed to start");
                self.state.write().last_error = Some(e);
                return false;
            }
        };

        {
            // Re-check under the write lock: a speak or context switch
            // may have landed while the provider was starting.
            let mut st = self.state.write();
            if st.speaking || st.processing_cooldown {
                drop(st);
                debug!(target: "channel", "start_listening lost the race to a speaker; ignored");
                self.recognizer.stop();
                return false;
            }
            st.transcript_buffer.clear();
            st.last_error = None;
            st.listening = true;
        }
        self.metrics.write().listen_cycles += 1;
        debug!(
            target: "channel",
            generation,
            ?mode,
            silence_ms = policy.silence_timeout_ms,
            no_speech_ms = policy.no_speech_timeout_ms,
            "listen cycle started"
        );
        let _ = self.events.send(ChannelEvent::ListeningStarted);

        let cycle = ListenCycle {
            generation,
            rx,
            policy,
            mode,
            state: self.state.clone(),
            events: self.events.clone(),
            listen_gen: self.listen_gen.clone(),
            metrics: self.metrics.clone(),
            recognizer: self.recognizer.clone(),
        };
        tokio::spawn(cycle.run());
        true
    }

    /// Stop listening. Idempotent; invalidates both listen timers.
    pub fn stop_listening(&self) {
        self.listen_gen.fetch_add(1, Ordering::SeqCst);
        self.recognizer.stop();
        let was_listening = {
            let mut st = self.state.write();
            std::mem::replace(&mut st.listening, false)
        };
        if was_listening {
            debug!(target: "channel", "listening stopped manually");
            let _ = self
                .events
                .send(ChannelEvent::ListeningStopped {
                    reason: StopReason::Manual,
                });
        }
    }

    /// Synthesize `text` and resolve when playback ends, errors, or is
    /// blocked. Never returns an error; empty text is a no-op.
    pub async fn speak(&self, text: &str, options: SpeakOptions) -> SpeakOutcome {
        if text.trim().is_empty() {
            debug!(target: "channel", "speak ignored: empty text");
            return SpeakOutcome::Skipped;
        }

        // Half-duplex: a speak request preempts the microphone.
        if self.state.read().listening {
            self.stop_listening();
        }

        let generation = self.speak_gen.fetch_add(1, Ordering::SeqCst) + 1;
        self.synthesizer.cancel();
        self.state.write().speaking = true;
        self.metrics.write().synth_requests += 1;
        let _ = self.events.send(ChannelEvent::SpeakingStarted);

        let rate = options.rate.unwrap_or(1.0);
        let outcome = self
            .synthesizer
            .speak(text, self.config.locale, rate)
            .await;

        // A newer speak or a context switch owns `speaking` now.
        if self.speak_gen.load(Ordering::SeqCst) == generation {
            self.state.write().speaking = false;
            let _ = self.events.send(ChannelEvent::SpeakingFinished);
        }

        match outcome {
            SynthesisOutcome::Completed => SpeakOutcome::Completed,
            SynthesisOutcome::Blocked => {
                info!(target: "channel", "synthesis blocked by platform policy");
                SpeakOutcome::Blocked
            }
            SynthesisOutcome::Error(msg) => {
                warn!(target: "channel", error = %msg, "synthesis failed");
                SpeakOutcome::Failed
            }
        }
    }

    /// Clear the transcript buffer without touching listening state.
    pub fn reset_transcript(&self) {
        self.state.write().transcript_buffer.clear();
    }

    /// Route/flow change: synchronously stop synthesis and recognition,
    /// clear the buffer, and raise the airlock cooldown so a stale
    /// listener or leftover transcript cannot leak into the next flow.
    pub fn on_context_switch(&self) {
        self.listen_gen.fetch_add(1, Ordering::SeqCst);
        self.speak_gen.fetch_add(1, Ordering::SeqCst);
        self.synthesizer.cancel();
        self.recognizer.stop();

        let was_listening = {
            let mut st = self.state.write();
            let was = st.listening;
            st.listening = false;
            st.speaking = false;
            st.transcript_buffer.clear();
            st.processing_cooldown = true;
            was
        };
        info!(target: "channel", "context switch: channel reset, airlock raised");
        if was_listening {
            let _ = self.events.send(ChannelEvent::ListeningStopped {
                reason: StopReason::ContextSwitch,
            });
        }
        let _ = self.events.send(ChannelEvent::ContextSwitched);

        let generation = self.cooldown_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let cooldown_gen = self.cooldown_gen.clone();
        let state = self.state.clone();
        let events = self.events.clone();
        let window = self.config.cooldown();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if cooldown_gen.load(Ordering::SeqCst) != generation {
                return;
            }
            state.write().processing_cooldown = false;
            let _ = events.send(ChannelEvent::CooldownCleared);
        });
    }
}

/// One listen cycle's event loop.
///
/// The no-speech window governs until the first recognition event; after
/// that the silence window is re-armed on every event, interim or final.
/// Every await is followed by a generation check, so a timer armed by an
/// earlier cycle can never act on a later one (last-armed-wins).
struct ListenCycle {
    generation: u64,
    rx: mpsc::Receiver<RecognitionEvent>,
    policy: TimeoutPolicy,
    mode: TranscriptMode,
    state: Arc<RwLock<ChannelState>>,
    events: broadcast::Sender<ChannelEvent>,
    listen_gen: Arc<AtomicU64>,
    metrics: Arc<RwLock<ChannelMetrics>>,
    recognizer: Arc<dyn RecognitionProvider>,
}

impl ListenCycle {
    async fn run(mut self) {
        let mut received_any = false;
        loop {
            let window = if received_any {
                self.policy.silence_timeout()
            } else {
                self.policy.no_speech_timeout()
            };
            let next = tokio::time::timeout(window, self.rx.recv()).await;
            if self.stale() {
                return;
            }
            match next {
                Err(_) => {
                    let kind = if received_any {
                        TimeoutKind::Silence
                    } else {
                        TimeoutKind::NoSpeech
                    };
                    self.finish_timeout(kind);
                    return;
                }
                Ok(None) => {
                    self.finish_closed();
                    return;
                }
                Ok(Some(RecognitionEvent::Partial { text, .. })) => {
                    received_any = true;
                    self.apply_partial(&text);
                }
                Ok(Some(RecognitionEvent::Final { text, .. })) => {
                    received_any = true;
                    self.apply_final(&text);
                }
                Ok(Some(RecognitionEvent::Error { code, message })) => {
                    self.finish_error(&code, message);
                    return;
                }
            }
        }
    }

    fn stale(&self) -> bool {
        self.listen_gen.load(Ordering::SeqCst) != self.generation
    }

    fn apply_final(&self, text: &str) {
        let text = text.trim();
        let committed = {
            let mut st = self.state.write();
            match self.mode {
                TranscriptMode::Accumulate => {
                    if !st.transcript_buffer.is_empty() && !text.is_empty() {
                        st.transcript_buffer.push(' ');
                    }
                    st.transcript_buffer.push_str(text);
                }
                TranscriptMode::Replace => {
                    st.transcript_buffer = text.to_string();
                }
            }
            st.transcript_buffer.clone()
        };
        self.metrics.write().segments_merged += 1;
        let _ = self.events.send(ChannelEvent::TranscriptUpdated {
            preview: committed.clone(),
            committed,
        });
    }

    fn apply_partial(&self, text: &str) {
        let text = text.trim();
        let committed = self.state.read().transcript_buffer.clone();
        let preview = match self.mode {
            // Interim text never commits, but in accumulate mode the
            // caller needs a live "heard so far" concatenation.
            TranscriptMode::Accumulate if !committed.is_empty() => {
                format!("{} {}", committed, text)
            }
            _ => text.to_string(),
        };
        let _ = self
            .events
            .send(ChannelEvent::TranscriptUpdated { committed, preview });
    }

    fn finish_timeout(&self, kind: TimeoutKind) {
        self.listen_gen.fetch_add(1, Ordering::SeqCst);
        self.recognizer.stop();
        self.state.write().listening = false;
        let reason = match kind {
            TimeoutKind::NoSpeech => {
                self.metrics.write().no_speech_timeouts += 1;
                StopReason::NoSpeech
            }
            TimeoutKind::Silence => {
                self.metrics.write().silence_timeouts += 1;
                StopReason::Silence
            }
        };
        debug!(target: "channel", %kind, "listen cycle timed out");
        let _ = self.events.send(ChannelEvent::ListeningStopped { reason });
    }

    fn finish_error(&self, code: &str, message: String) {
        self.listen_gen.fetch_add(1, Ordering::SeqCst);
        self.recognizer.stop();
        warn!(target: "channel", code, error = %message, "recognition provider error");
        {
            let mut st = self.state.write();
            st.listening = false;
            st.last_error = Some(VoiceError::RecognitionFailed(message));
        }
        self.metrics.write().provider_errors += 1;
        let _ = self.events.send(ChannelEvent::ListeningStopped {
            reason: StopReason::ProviderError,
        });
    }

    fn finish_closed(&self) {
        self.listen_gen.fetch_add(1, Ordering::SeqCst);
        info!(target: "channel", "recognition stream closed");
        {
            let mut st = self.state.write();
            st.listening = false;
            st.last_error = Some(VoiceError::RecognitionFailed(
                "recognition stream closed".into(),
            ));
        }
        self.metrics.write().provider_errors += 1;
        let _ = self.events.send(ChannelEvent::ListeningStopped {
            reason: StopReason::ProviderError,
        });
    }
}
