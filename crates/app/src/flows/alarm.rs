//! Alarm (dose reminder) response.

use vaani_dialog::{
    ConversationEngine, DialogStep, Flow, FlowError, FlowOutcome, ParsedValue, ParserKind,
    RetryPolicy, StepOutcome, StepValue,
};
use vaani_foundation::TranscriptMode;
use vaani_parse::Affirmation;

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmAction {
    Dismissed,
    /// "No", ambiguity, and silence all snooze; the reminder fires
    /// again rather than being lost.
    Snoozed,
}

pub async fn run_alarm_response(
    engine: &ConversationEngine,
    cfg: &AppConfig,
) -> Result<AlarmAction, FlowError> {
    let flow = alarm_flow(cfg);
    let report = engine.run(&flow).await?;
    let action = match report.values.get("dismiss") {
        Some(StepValue::Confirmation(Affirmation::Yes))
            if report.outcome == FlowOutcome::Completed =>
        {
            AlarmAction::Dismissed
        }
        _ => AlarmAction::Snoozed,
    };
    Ok(action)
}

fn alarm_flow(cfg: &AppConfig) -> Flow {
    Flow::new(
        "alarm-response",
        cfg.command,
        TranscriptMode::Replace,
        cfg.locale,
    )
    .auto_advance(cfg.auto_advance())
    .step(
        DialogStep::new("dismiss", "alarm.ask_dismiss", ParserKind::YesNo)
            .validate(|parsed| match parsed {
                ParsedValue::YesNo(Some(a)) => Ok(StepValue::Confirmation(*a)),
                _ => Err("need a yes or a no".into()),
            })
            .on_success(|_| StepOutcome::Finish(FlowOutcome::Completed))
            .on_failure(RetryPolicy::bounded(
                2,
                "alarm.dismiss.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
}
