//! The concrete user flows.
//!
//! Each flow declares its dialog steps and hands them to the engine;
//! record side effects live inside `on_success` handlers and nowhere
//! else. Phone capture and OTP acquisition are shared between login and
//! registration.

pub mod alarm;
pub mod login;
pub mod registration;
pub mod schedule;

use tracing::warn;

use vaani_dialog::{
    ConversationEngine, DialogStep, Flow, FlowOutcome, FlowReport, ParsedValue, ParserKind,
    RetryPolicy, StepOutcome, StepValue,
};
use vaani_foundation::TranscriptMode;
use vaani_otp::{CaptureCancel, CredentialCaptureChain};
use vaani_parse::PhoneNumber;

use crate::config::AppConfig;

/// Single-step flow capturing a mobile number, digit-by-digit friendly:
/// long-form timing, accumulate mode, auto-submit on a short pause.
pub(crate) fn phone_capture_flow(cfg: &AppConfig) -> Flow {
    Flow::new(
        "phone-capture",
        cfg.registration,
        TranscriptMode::Accumulate,
        cfg.locale,
    )
    .auto_advance(cfg.auto_advance())
    .step(
        DialogStep::new("phone", "login.ask_phone", ParserKind::Phone)
            .validate(|parsed| match parsed {
                ParsedValue::Phone(p) if p.is_valid => Ok(StepValue::Phone(p.clone())),
                _ => Err("not a valid mobile number".into()),
            })
            .on_success(|_| StepOutcome::Finish(FlowOutcome::Completed))
            .on_failure(RetryPolicy::bounded(
                3,
                "login.ask_phone.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
}

/// Voice OTP entry, used as the capture chain's fallback step.
pub(crate) fn otp_voice_flow(cfg: &AppConfig) -> Flow {
    Flow::new(
        "otp-voice",
        cfg.registration,
        TranscriptMode::Accumulate,
        cfg.locale,
    )
    .auto_advance(cfg.auto_advance())
    .step(
        DialogStep::new("otp", "login.otp.voice", ParserKind::Number)
            .validate(|parsed| match parsed {
                ParsedValue::Digits(d) if (4..=6).contains(&d.len()) => {
                    Ok(StepValue::Digits(d.clone()))
                }
                _ => Err("code must be four to six digits".into()),
            })
            .on_success(|_| StepOutcome::Finish(FlowOutcome::Completed))
            .on_failure(RetryPolicy::bounded(
                3,
                "login.otp.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
}

/// Run the capture race; on deadline expiry the voice flow above asks
/// the user to read the code aloud.
pub(crate) async fn acquire_otp(
    engine: &ConversationEngine,
    chain: &CredentialCaptureChain,
    cfg: &AppConfig,
    cancel: CaptureCancel,
) -> Option<String> {
    let flow = otp_voice_flow(cfg);
    let voice = || async {
        match engine.run(&flow).await {
            Ok(report) if report.outcome == FlowOutcome::Completed => {
                digits_value(&report, "otp")
            }
            Ok(_) => None,
            Err(e) => {
                warn!(target: "flows", error = %e, "otp voice flow failed");
                None
            }
        }
    };
    chain.acquire(cfg.otp_deadline(), cancel, voice).await.ok()
}

pub(crate) fn digits_value(report: &FlowReport, step: &str) -> Option<String> {
    match report.values.get(step) {
        Some(StepValue::Digits(d)) => Some(d.clone()),
        _ => None,
    }
}

pub(crate) fn phone_value(report: &FlowReport) -> Option<PhoneNumber> {
    match report.values.get("phone") {
        Some(StepValue::Phone(p)) => Some(p.clone()),
        _ => None,
    }
}
