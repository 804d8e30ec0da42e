//! End-to-end flow scenarios over scripted providers, virtual time.

use std::sync::Arc;
use std::time::Duration;

use vaani_app::config::AppConfig;
use vaani_app::demo::DemoCapture;
use vaani_app::flows::alarm::{run_alarm_response, AlarmAction};
use vaani_app::flows::login::{run_login, LoginOutcome};
use vaani_app::flows::registration::run_registration;
use vaani_app::flows::schedule::run_schedule_confirmation;
use vaani_app::prompts::PromptCatalog;
use vaani_app::records::{MemoryStore, ProfileStore, ReminderStore, UserProfile};
use vaani_channel::mock::{final_after, ScriptedRecognizer, ScriptedSynthesizer};
use vaani_channel::{ChannelConfig, SpeechChannel};
use vaani_dialog::ConversationEngine;
use vaani_otp::CredentialCaptureChain;

fn engine_over(recognizer: &Arc<ScriptedRecognizer>, cfg: &AppConfig) -> ConversationEngine {
    let channel = SpeechChannel::new(
        recognizer.clone(),
        ScriptedSynthesizer::new(Duration::ZERO),
        ChannelConfig {
            locale: cfg.locale,
            cooldown_ms: cfg.cooldown_ms,
            ..ChannelConfig::default()
        },
    )
    .expect("channel");
    ConversationEngine::new(Arc::new(channel), Arc::new(PromptCatalog))
}

#[tokio::test(start_paused = true)]
async fn registration_stores_a_profile_via_voice_otp() {
    let recognizer = ScriptedRecognizer::new();
    // Phone across two utterances, voice OTP (no capture capability),
    // then name and age.
    recognizer.push_cycle(vec![
        final_after(600, "नौ आठ सात छह पाँच"),
        final_after(900, "चार तीन दो एक शून्य"),
    ]);
    recognizer.push_cycle(vec![final_after(700, "चार आठ दो एक")]);
    recognizer.push_cycle(vec![final_after(700, "आशा देवी")]);
    recognizer.push_cycle(vec![final_after(700, "पैंसठ")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let chain = CredentialCaptureChain::new(DemoCapture::missing());
    let store = Arc::new(MemoryStore::new());
    let profiles: Arc<dyn ProfileStore> = store.clone();

    let profile = run_registration(&engine, &chain, &profiles, &cfg)
        .await
        .expect("run")
        .expect("profile stored");

    assert_eq!(
        profile,
        UserProfile {
            phone: "+919876543210".into(),
            name: "आशा देवी".into(),
            age: 65,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn login_signs_in_a_known_user_with_automatic_code() {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(600, "9876543210")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    // The code arrives automatically well before the deadline, so no
    // voice OTP cycle is scripted.
    let chain = CredentialCaptureChain::new(DemoCapture::delivering(
        Duration::from_millis(1_500),
        "4821",
    ));

    let store = Arc::new(MemoryStore::new());
    let profiles: Arc<dyn ProfileStore> = store.clone();
    let asha = UserProfile {
        phone: "+919876543210".into(),
        name: "आशा देवी".into(),
        age: 67,
    };
    profiles.upsert(asha.clone());

    let outcome = run_login(&engine, &chain, &profiles, &cfg).await.expect("run");
    assert_eq!(outcome, LoginOutcome::SignedIn(asha));
}

#[tokio::test(start_paused = true)]
async fn login_with_unknown_number_requests_registration() {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(600, "9123456780")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let chain = CredentialCaptureChain::new(DemoCapture::delivering(
        Duration::from_millis(500),
        "4821",
    ));
    let store = Arc::new(MemoryStore::new());
    let profiles: Arc<dyn ProfileStore> = store.clone();

    let outcome = run_login(&engine, &chain, &profiles, &cfg).await.expect("run");
    match outcome {
        LoginOutcome::NeedsRegistration(phone) => {
            assert_eq!(phone.formatted, "+919123456780");
        }
        other => panic!("expected registration hand-off, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn login_falls_back_to_manual_after_phone_retries() {
    // Three silent listen cycles exhaust the phone step's retry budget.
    let recognizer = ScriptedRecognizer::new();

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let chain = CredentialCaptureChain::new(DemoCapture::missing());
    let store = Arc::new(MemoryStore::new());
    let profiles: Arc<dyn ProfileStore> = store.clone();

    let outcome = run_login(&engine, &chain, &profiles, &cfg).await.expect("run");
    assert_eq!(outcome, LoginOutcome::Incomplete);
}

#[tokio::test(start_paused = true)]
async fn declining_the_proposed_hour_negotiates_a_new_time() {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "जी नहीं")]);
    recognizer.push_cycle(vec![final_after(600, "शाम सात बजे")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let store = Arc::new(MemoryStore::new());
    let reminders: Arc<dyn ReminderStore> = store.clone();

    let schedule = run_schedule_confirmation(&engine, &reminders, &cfg, "+919876543210", "मेटफॉर्मिन")
        .await
        .expect("run")
        .expect("schedule stored");

    assert_eq!(schedule.medicine, "मेटफॉर्मिन");
    assert_eq!(schedule.hours, vec![19]);
}

#[tokio::test(start_paused = true)]
async fn accepting_the_proposed_hour_stores_the_default() {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "जी हाँ")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let store = Arc::new(MemoryStore::new());
    let reminders: Arc<dyn ReminderStore> = store.clone();

    let schedule = run_schedule_confirmation(&engine, &reminders, &cfg, "+919876543210", "मेटफॉर्मिन")
        .await
        .expect("run")
        .expect("schedule stored");
    assert_eq!(schedule.hours, vec![8]);
}

#[tokio::test(start_paused = true)]
async fn ambiguous_schedule_answers_leave_the_schedule_unchanged() {
    // Both cycles hear something that is neither yes nor no.
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "शायद")]);
    recognizer.push_cycle(vec![final_after(500, "सोचती हूँ")]);

    let cfg = AppConfig::default();
    let engine = engine_over(&recognizer, &cfg);
    let store = Arc::new(MemoryStore::new());
    let reminders: Arc<dyn ReminderStore> = store.clone();
    let existing = vaani_app::records::DoseSchedule {
        medicine: "मेटफॉर्मिन".into(),
        hours: vec![8, 20],
    };
    reminders.save_schedule("+919876543210", existing.clone());

    let schedule = run_schedule_confirmation(&engine, &reminders, &cfg, "+919876543210", "मेटफॉर्मिन")
        .await
        .expect("run");
    assert_eq!(schedule, Some(existing));
}

#[tokio::test(start_paused = true)]
async fn alarm_dismisses_on_yes_and_snoozes_on_silence() {
    let cfg = AppConfig::default();

    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "हाँ ले ली")]);
    let engine = engine_over(&recognizer, &cfg);
    assert_eq!(
        run_alarm_response(&engine, &cfg).await.expect("run"),
        AlarmAction::Dismissed
    );

    // No scripted speech at all: both attempts hear silence, the retry
    // budget runs out, and the reminder snoozes by default.
    let silent = ScriptedRecognizer::new();
    let engine = engine_over(&silent, &cfg);
    assert_eq!(
        run_alarm_response(&engine, &cfg).await.expect("run"),
        AlarmAction::Snoozed
    );
}
