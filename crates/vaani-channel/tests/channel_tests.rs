//! Listen/speak mutex, timer, and airlock behavior under virtual time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use vaani_channel::mock::{error_after, final_after, partial_after, ScriptedRecognizer, ScriptedSynthesizer};
use vaani_channel::{ChannelConfig, ChannelEvent, SpeakOptions, SpeakOutcome, SpeechChannel, StopReason, SynthesisProvider};
use vaani_foundation::{TimeoutPolicy, TranscriptMode, VoiceError};

fn test_channel(
    recognizer: Arc<ScriptedRecognizer>,
    synthesizer: Arc<ScriptedSynthesizer>,
) -> SpeechChannel {
    SpeechChannel::new(recognizer, synthesizer, ChannelConfig::default()).expect("channel")
}

async fn wait_for_stop(rx: &mut broadcast::Receiver<ChannelEvent>) -> StopReason {
    loop {
        match rx.recv().await.expect("event stream open") {
            ChannelEvent::ListeningStopped { reason } => return reason,
            _ => continue,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn construction_fails_once_when_unsupported() {
    let result = SpeechChannel::new(
        ScriptedRecognizer::unavailable(),
        ScriptedSynthesizer::new(Duration::from_millis(10)),
        ChannelConfig::default(),
    );
    match result {
        Err(VoiceError::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test(start_paused = true)]
async fn start_listening_noops_while_speaking() {
    let recognizer = ScriptedRecognizer::new();
    let synthesizer = ScriptedSynthesizer::new(Duration::from_secs(60));
    let channel = Arc::new(test_channel(recognizer, synthesizer.clone()));

    let speaking = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.speak("दवा का समय हो गया", SpeakOptions::default()).await })
    };
    // Let the speak task run up to its playback await.
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert!(channel.state_snapshot().speaking);

    let started = channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;
    assert!(!started);
    assert!(!channel.state_snapshot().listening);

    synthesizer.cancel();
    let outcome = speaking.await.expect("join");
    assert_eq!(outcome, SpeakOutcome::Completed);
    assert!(!channel.state_snapshot().speaking);
}

#[tokio::test(start_paused = true)]
async fn no_speech_window_force_stops_with_empty_buffer() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![]);
    let started_at = tokio::time::Instant::now();
    assert!(
        channel
            .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
            .await
    );

    assert_eq!(wait_for_stop(&mut events).await, StopReason::NoSpeech);
    assert_eq!(
        started_at.elapsed(),
        TimeoutPolicy::quick_command().no_speech_timeout()
    );
    assert!(!channel.state_snapshot().listening);
    assert_eq!(channel.transcript(), "");
    assert_eq!(channel.metrics().no_speech_timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn silence_timer_rearms_on_each_event_and_accumulates() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    // Second segment lands 1000ms after the first, inside the 1500ms
    // silence window, so the stop must key off the second event.
    recognizer.push_cycle(vec![final_after(1000, "नौ आठ सात छह पाँच"), final_after(1000, "चार तीन दो एक शून्य")]);
    let started_at = tokio::time::Instant::now();
    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Accumulate)
        .await;

    assert_eq!(wait_for_stop(&mut events).await, StopReason::Silence);
    let policy = TimeoutPolicy::quick_command();
    assert_eq!(
        started_at.elapsed(),
        Duration::from_millis(2000) + policy.silence_timeout()
    );
    assert_eq!(channel.transcript(), "नौ आठ सात छह पाँच चार तीन दो एक शून्य");
    assert_eq!(channel.metrics().segments_merged, 2);
}

#[tokio::test(start_paused = true)]
async fn replace_mode_keeps_only_latest_segment() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![final_after(100, "हाँ"), final_after(200, "नहीं")]);
    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;
    wait_for_stop(&mut events).await;

    assert_eq!(channel.transcript(), "नहीं");
}

#[tokio::test(start_paused = true)]
async fn interim_results_preview_without_committing_in_replace_mode() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![partial_after(100, "हा"), final_after(200, "हाँ")]);
    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;

    let mut saw_uncommitted_preview = false;
    loop {
        match events.recv().await.expect("events") {
            ChannelEvent::TranscriptUpdated { committed, preview } => {
                if committed.is_empty() && preview == "हा" {
                    saw_uncommitted_preview = true;
                }
            }
            ChannelEvent::ListeningStopped { .. } => break,
            _ => {}
        }
    }
    assert!(saw_uncommitted_preview);
    assert_eq!(channel.transcript(), "हाँ");
}

#[tokio::test(start_paused = true)]
async fn accumulate_mode_previews_live_concatenation() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![final_after(100, "नौ आठ"), partial_after(100, "सात")]);
    channel
        .start_listening(TimeoutPolicy::elder_friendly(), TranscriptMode::Accumulate)
        .await;

    let mut saw_live_preview = false;
    loop {
        match events.recv().await.expect("events") {
            ChannelEvent::TranscriptUpdated { committed, preview } => {
                if committed == "नौ आठ" && preview == "नौ आठ सात" {
                    saw_live_preview = true;
                }
            }
            ChannelEvent::ListeningStopped { .. } => break,
            _ => {}
        }
    }
    assert!(saw_live_preview);
    // The interim segment never committed.
    assert_eq!(channel.transcript(), "नौ आठ");
}

#[tokio::test(start_paused = true)]
async fn context_switch_resets_channel_and_raises_airlock() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![final_after(100, "पुरानी बात")]);
    channel
        .start_listening(TimeoutPolicy::elder_friendly(), TranscriptMode::Accumulate)
        .await;
    // Wait for the first transcript commit, then switch context mid-listen.
    loop {
        if let ChannelEvent::TranscriptUpdated { .. } = events.recv().await.expect("events") {
            break;
        }
    }
    channel.on_context_switch();

    let st = channel.state_snapshot();
    assert!(!st.listening);
    assert!(!st.speaking);
    assert!(st.processing_cooldown);
    assert_eq!(st.transcript_buffer, "");

    // Listening is blocked during the airlock window.
    assert!(
        !channel
            .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
            .await
    );

    loop {
        if let ChannelEvent::CooldownCleared = events.recv().await.expect("events") {
            break;
        }
    }
    assert!(!channel.state_snapshot().processing_cooldown);
    assert!(
        channel
            .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
            .await
    );
}

#[tokio::test(start_paused = true)]
async fn stale_cycle_timers_never_fire_into_a_new_cycle() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    // First cycle would time out at 6s; stop it manually right away.
    recognizer.push_cycle(vec![]);
    recognizer.push_cycle(vec![final_after(100, "नया")]);
    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;
    channel.stop_listening();
    assert_eq!(wait_for_stop(&mut events).await, StopReason::Manual);

    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;
    // Only the new cycle's silence stop may arrive; a stop attributed to
    // the first cycle's no-speech timer would show up as NoSpeech first.
    assert_eq!(wait_for_stop(&mut events).await, StopReason::Silence);
    assert_eq!(channel.transcript(), "नया");
}

#[tokio::test(start_paused = true)]
async fn provider_error_stops_listening_without_crashing() {
    let recognizer = ScriptedRecognizer::new();
    let channel = test_channel(recognizer.clone(), ScriptedSynthesizer::new(Duration::ZERO));
    let mut events = channel.subscribe();

    recognizer.push_cycle(vec![error_after(100, "engine fault")]);
    channel
        .start_listening(TimeoutPolicy::quick_command(), TranscriptMode::Replace)
        .await;

    assert_eq!(wait_for_stop(&mut events).await, StopReason::ProviderError);
    let st = channel.state_snapshot();
    assert!(!st.listening);
    assert!(matches!(st.last_error, Some(VoiceError::RecognitionFailed(_))));
    assert_eq!(channel.metrics().provider_errors, 1);
}

#[tokio::test(start_paused = true)]
async fn empty_speak_is_skipped() {
    let synthesizer = ScriptedSynthesizer::new(Duration::from_millis(10));
    let channel = test_channel(ScriptedRecognizer::new(), synthesizer.clone());

    assert_eq!(
        channel.speak("   ", SpeakOptions::default()).await,
        SpeakOutcome::Skipped
    );
    assert!(synthesizer.spoken().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blocked_synthesis_resolves_instead_of_erroring() {
    let synthesizer = ScriptedSynthesizer::new(Duration::from_millis(10));
    let channel = test_channel(ScriptedRecognizer::new(), synthesizer.clone());

    synthesizer.push_outcome(vaani_channel::SynthesisOutcome::Blocked);
    let outcome = channel.speak("नमस्ते", SpeakOptions::default()).await;
    assert_eq!(outcome, SpeakOutcome::Blocked);
    assert!(!channel.state_snapshot().speaking);
}

#[tokio::test(start_paused = true)]
async fn new_speak_preempts_the_previous_one() {
    let recognizer = ScriptedRecognizer::new();
    let synthesizer = ScriptedSynthesizer::new(Duration::from_secs(30));
    let channel = Arc::new(test_channel(recognizer, synthesizer.clone()));

    let first = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.speak("पहला", SpeakOptions::default()).await })
    };
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    let second = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.speak("दूसरा", SpeakOptions::default()).await })
    };
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    // First resolved by cancellation; channel still speaking for second.
    first.await.expect("join");
    assert!(channel.state_snapshot().speaking);
    assert_eq!(synthesizer.spoken(), vec!["पहला".to_string(), "दूसरा".to_string()]);

    synthesizer.cancel();
    second.await.expect("join");
    assert!(!channel.state_snapshot().speaking);
}
