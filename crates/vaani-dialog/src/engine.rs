//! The turn-based state-machine driver.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vaani_channel::{ChannelEvent, SpeakOptions, SpeechChannel};

use crate::flow::{apply_parser, Flow, FlowOutcome, PromptSource, StepOutcome, StepValue};

/// Flow-definition errors. Conversational misses (bad input, timeouts)
/// are not errors; they drive the retry loop.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("flow references unknown step `{0}`")]
    UnknownStep(String),
}

/// What a finished flow hands back to the host screen.
#[derive(Debug)]
pub struct FlowReport {
    pub outcome: FlowOutcome,
    /// Validated value per completed step id.
    pub values: HashMap<String, StepValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Prompting,
    Listening,
    Parsing,
    Validating,
    Retry,
    Terminal,
}

enum Listened {
    Transcript(String),
    Cancelled,
}

/// Drives one [`Flow`] at a time over a shared speech channel.
pub struct ConversationEngine {
    channel: Arc<SpeechChannel>,
    prompts: Arc<dyn PromptSource>,
    cancel_tx: watch::Sender<bool>,
}

impl ConversationEngine {
    pub fn new(channel: Arc<SpeechChannel>, prompts: Arc<dyn PromptSource>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            channel,
            prompts,
            cancel_tx,
        }
    }

    pub fn channel(&self) -> &Arc<SpeechChannel> {
        &self.channel
    }

    /// Cancel the running flow. This is the single authoritative
    /// cancellation point: the channel is context-switched immediately
    /// so no stray transcript leaks into whatever flow starts next.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
        self.channel.on_context_switch();
    }

    /// Execute the flow to a terminal state.
    pub async fn run(&self, flow: &Flow) -> Result<FlowReport, FlowError> {
        self.cancel_tx.send_replace(false);
        let mut cancel_rx = self.cancel_tx.subscribe();

        let mut values: HashMap<String, StepValue> = HashMap::new();
        let mut attempts: HashMap<String, u32> = HashMap::new();
        let mut current = flow.entry.clone();
        let mut state = EngineState::Prompting;
        info!(target: "dialog", flow = %flow.id, entry = %current, "flow started");

        loop {
            let step = flow
                .steps
                .get(&current)
                .ok_or_else(|| FlowError::UnknownStep(current.clone()))?;

            self.transition(&mut state, EngineState::Prompting, flow, &current);
            let prompt = self.prompts.prompt(flow.locale, &step.prompt_key);
            // Completing the prompt is the only trigger to start
            // listening; the step chose the text, so the channel's own
            // mutex cannot serialize this for us.
            self.channel.speak(&prompt, SpeakOptions::default()).await;
            if *cancel_rx.borrow() {
                return Ok(Self::cancelled_report(flow, values));
            }

            self.transition(&mut state, EngineState::Listening, flow, &current);
            let raw = match self.listen_once(flow, &mut cancel_rx).await {
                Listened::Transcript(raw) => raw,
                Listened::Cancelled => return Ok(Self::cancelled_report(flow, values)),
            };
            if *cancel_rx.borrow() {
                return Ok(Self::cancelled_report(flow, values));
            }

            self.transition(&mut state, EngineState::Parsing, flow, &current);
            let parsed = apply_parser(step.expects, &raw, flow.locale);

            self.transition(&mut state, EngineState::Validating, flow, &current);
            match (step.validate)(&parsed) {
                Ok(value) => {
                    let outcome = (step.on_success)(&value);
                    values.insert(current.clone(), value);
                    attempts.remove(&current);
                    match outcome {
                        StepOutcome::Next(next) => {
                            debug!(target: "dialog", from = %current, to = %next, "advancing");
                            current = next;
                        }
                        StepOutcome::Finish(outcome) => {
                            self.transition(&mut state, EngineState::Terminal, flow, &current);
                            info!(target: "dialog", flow = %flow.id, ?outcome, "flow finished");
                            return Ok(FlowReport { outcome, values });
                        }
                    }
                }
                Err(reason) => {
                    // Expected conversational miss, never an application
                    // error; the step's retry policy owns what happens.
                    debug!(target: "dialog", step = %current, %reason, "validation rejected input");
                    self.channel.stop_listening();
                    self.channel.reset_transcript();
                    self.transition(&mut state, EngineState::Retry, flow, &current);

                    let made = attempts.entry(current.clone()).or_insert(0);
                    *made += 1;
                    let policy = &step.on_failure;
                    if policy.max_attempts.map_or(true, |max| *made < max) {
                        if let Some(key) = &policy.retry_prompt_key {
                            let text = self.prompts.prompt(flow.locale, key);
                            self.channel.speak(&text, SpeakOptions::default()).await;
                        }
                    } else {
                        info!(
                            target: "dialog",
                            step = %current,
                            attempts = *made,
                            "retry budget exhausted, taking default path"
                        );
                        attempts.remove(&current);
                        match policy.on_exhausted.clone() {
                            StepOutcome::Next(next) => current = next,
                            StepOutcome::Finish(outcome) => {
                                self.transition(&mut state, EngineState::Terminal, flow, &current);
                                return Ok(FlowReport { outcome, values });
                            }
                        }
                    }
                    if *cancel_rx.borrow() {
                        return Ok(Self::cancelled_report(flow, values));
                    }
                }
            }
        }
    }

    /// One listen cycle: wait for the channel to stop (silence,
    /// no-speech, error) or for the flow's own quiet period after the
    /// latest transcript update, whichever fires first.
    async fn listen_once(
        &self,
        flow: &Flow,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> Listened {
        let mut events = self.channel.subscribe();
        let mut started = self.channel.start_listening(flow.policy, flow.mode).await;

        if !started && self.channel.state_snapshot().processing_cooldown {
            // The airlock from a fresh context switch blocks exactly one
            // window; wait for clearance and retry once.
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => return Listened::Cancelled,
                    ev = events.recv() => match ev {
                        Ok(ChannelEvent::CooldownCleared) => break,
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            started = self.channel.start_listening(flow.policy, flow.mode).await;
        }

        if !started {
            debug!(target: "dialog", flow = %flow.id, "listen did not start; submitting empty transcript");
            return Listened::Transcript(String::new());
        }

        let mut quiet_deadline: Option<Instant> = None;
        loop {
            tokio::select! {
                biased;
                _ = cancel_rx.changed() => return Listened::Cancelled,
                ev = events.recv() => match ev {
                    Ok(ChannelEvent::TranscriptUpdated { .. }) => {
                        if let Some(window) = flow.auto_advance {
                            quiet_deadline = Some(Instant::now() + window);
                        }
                    }
                    Ok(ChannelEvent::ListeningStopped { reason }) => {
                        debug!(target: "dialog", ?reason, "listen cycle ended");
                        break;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(target: "dialog", missed, "channel event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = quiet_elapsed(quiet_deadline), if quiet_deadline.is_some() => {
                    debug!(target: "dialog", "quiet period elapsed, auto-submitting buffer");
                    self.channel.stop_listening();
                    break;
                }
            }
        }
        Listened::Transcript(self.channel.transcript())
    }

    fn cancelled_report(flow: &Flow, values: HashMap<String, StepValue>) -> FlowReport {
        info!(target: "dialog", flow = %flow.id, "flow cancelled");
        FlowReport {
            outcome: FlowOutcome::Cancelled,
            values,
        }
    }

    fn transition(&self, state: &mut EngineState, next: EngineState, flow: &Flow, step: &str) {
        if *state != next {
            debug!(target: "dialog", flow = %flow.id, step, from = ?*state, to = ?next, "engine state");
            *state = next;
        }
    }
}

async fn quiet_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        // Guarded out by the caller's `if`; never resolves.
        None => std::future::pending().await,
    }
}
