//! Phone-verification login.

use std::sync::Arc;

use tracing::info;

use vaani_dialog::{ConversationEngine, FlowError, FlowOutcome};
use vaani_otp::{CaptureCancel, CredentialCaptureChain};
use vaani_parse::PhoneNumber;

use crate::config::AppConfig;
use crate::flows::{acquire_otp, phone_capture_flow, phone_value};
use crate::records::{ProfileStore, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(UserProfile),
    /// Verified number with no profile yet; the host should run the
    /// registration flow next.
    NeedsRegistration(PhoneNumber),
    /// The user never produced a usable number or code; the host falls
    /// back to its tap/type path.
    Incomplete,
}

pub async fn run_login(
    engine: &ConversationEngine,
    chain: &CredentialCaptureChain,
    profiles: &Arc<dyn ProfileStore>,
    cfg: &AppConfig,
) -> Result<LoginOutcome, FlowError> {
    let report = engine.run(&phone_capture_flow(cfg)).await?;
    if report.outcome != FlowOutcome::Completed {
        return Ok(LoginOutcome::Incomplete);
    }
    let Some(phone) = phone_value(&report) else {
        return Ok(LoginOutcome::Incomplete);
    };

    let Some(code) = acquire_otp(engine, chain, cfg, CaptureCancel::new()).await else {
        return Ok(LoginOutcome::Incomplete);
    };
    info!(target: "flows", phone = %phone.formatted, code_len = code.len(), "login verified");

    match profiles.find_by_phone(&phone.formatted) {
        Some(profile) => Ok(LoginOutcome::SignedIn(profile)),
        None => Ok(LoginOutcome::NeedsRegistration(phone)),
    }
}
