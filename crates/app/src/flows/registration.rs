//! New-patient registration: phone, OTP, name, age.

use std::sync::Arc;

use parking_lot::Mutex;

use vaani_dialog::{
    ConversationEngine, DialogStep, Flow, FlowError, FlowOutcome, ParsedValue, ParserKind,
    RetryPolicy, StepOutcome, StepValue,
};
use vaani_foundation::TranscriptMode;
use vaani_otp::{CaptureCancel, CredentialCaptureChain};
use vaani_parse::is_plausible_age;

use crate::config::AppConfig;
use crate::flows::{acquire_otp, phone_capture_flow, phone_value};
use crate::records::{ProfileStore, UserProfile};

/// Drive the whole registration task. Returns the stored profile, or
/// `None` when any stage fell back to the manual path.
pub async fn run_registration(
    engine: &ConversationEngine,
    chain: &CredentialCaptureChain,
    profiles: &Arc<dyn ProfileStore>,
    cfg: &AppConfig,
) -> Result<Option<UserProfile>, FlowError> {
    let report = engine.run(&phone_capture_flow(cfg)).await?;
    if report.outcome != FlowOutcome::Completed {
        return Ok(None);
    }
    let Some(phone) = phone_value(&report) else {
        return Ok(None);
    };

    if acquire_otp(engine, chain, cfg, CaptureCancel::new()).await.is_none() {
        return Ok(None);
    }

    let details = profile_details_flow(cfg, profiles.clone(), phone.formatted.clone());
    let report = engine.run(&details).await?;
    if report.outcome != FlowOutcome::Completed {
        return Ok(None);
    }
    Ok(profiles.find_by_phone(&phone.formatted))
}

/// Name then age; the age step's success handler writes the profile.
fn profile_details_flow(cfg: &AppConfig, profiles: Arc<dyn ProfileStore>, phone: String) -> Flow {
    // The name is captured one step earlier than the store write; the
    // slot carries it across.
    let name_slot = Arc::new(Mutex::new(String::new()));
    let name_for_age = name_slot.clone();

    Flow::new(
        "registration-details",
        cfg.registration,
        TranscriptMode::Accumulate,
        cfg.locale,
    )
    .auto_advance(cfg.auto_advance())
    .step(
        DialogStep::new("name", "registration.ask_name", ParserKind::FreeText)
            .on_success(move |value| {
                if let StepValue::Text(name) = value {
                    *name_slot.lock() = name.clone();
                }
                StepOutcome::Next("age".into())
            })
            .on_failure(RetryPolicy::bounded(
                3,
                "registration.name.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
    .step(
        DialogStep::new("age", "registration.ask_age", ParserKind::Age)
            .validate(|parsed| match parsed {
                ParsedValue::Digits(d) if is_plausible_age(d) => Ok(StepValue::Digits(d.clone())),
                _ => Err("not a plausible age".into()),
            })
            .on_success(move |value| {
                if let StepValue::Digits(digits) = value {
                    if let Ok(age) = digits.parse::<u32>() {
                        profiles.upsert(UserProfile {
                            phone: phone.clone(),
                            name: name_for_age.lock().clone(),
                            age,
                        });
                    }
                }
                StepOutcome::Finish(FlowOutcome::Completed)
            })
            .on_failure(RetryPolicy::bounded(
                3,
                "registration.age.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
}
