//! Medicine-schedule confirmation and time negotiation.

use std::sync::Arc;

use vaani_dialog::{
    ConversationEngine, DialogStep, Flow, FlowError, FlowOutcome, ParsedValue, ParserKind,
    RetryPolicy, StepOutcome, StepValue,
};
use vaani_foundation::TranscriptMode;
use vaani_parse::Affirmation;

use crate::config::AppConfig;
use crate::records::{DoseSchedule, ReminderStore};

/// Hour proposed when the user simply agrees.
const PROPOSED_HOUR: u8 = 8;

/// Confirm the proposed dose time, or negotiate a different one. A
/// retry budget that runs out leaves the stored schedule unchanged;
/// silence and ambiguity both mean "no change".
pub async fn run_schedule_confirmation(
    engine: &ConversationEngine,
    reminders: &Arc<dyn ReminderStore>,
    cfg: &AppConfig,
    phone: &str,
    medicine: &str,
) -> Result<Option<DoseSchedule>, FlowError> {
    let flow = schedule_flow(cfg, reminders.clone(), phone.to_string(), medicine.to_string());
    engine.run(&flow).await?;
    Ok(reminders.schedule_for(phone))
}

fn schedule_flow(
    cfg: &AppConfig,
    reminders: Arc<dyn ReminderStore>,
    phone: String,
    medicine: String,
) -> Flow {
    let reminders_confirm = reminders.clone();
    let phone_confirm = phone.clone();
    let medicine_confirm = medicine.clone();

    Flow::new(
        "schedule-confirmation",
        cfg.command,
        TranscriptMode::Replace,
        cfg.locale,
    )
    .auto_advance(cfg.auto_advance())
    .step(
        DialogStep::new("confirm", "schedule.confirm", ParserKind::YesNo)
            .validate(|parsed| match parsed {
                ParsedValue::YesNo(Some(a)) => Ok(StepValue::Confirmation(*a)),
                _ => Err("need a yes or a no".into()),
            })
            .on_success(move |value| match value {
                StepValue::Confirmation(Affirmation::Yes) => {
                    reminders_confirm.save_schedule(
                        &phone_confirm,
                        DoseSchedule {
                            medicine: medicine_confirm.clone(),
                            hours: vec![PROPOSED_HOUR],
                        },
                    );
                    StepOutcome::Finish(FlowOutcome::Completed)
                }
                _ => StepOutcome::Next("ask_time".into()),
            })
            .on_failure(RetryPolicy::bounded(
                2,
                "schedule.confirm.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
    .step(
        DialogStep::new("ask_time", "schedule.ask_time", ParserKind::TimeOfDay)
            .validate(|parsed| match parsed {
                ParsedValue::TimeOfDay(Some(t)) => Ok(StepValue::Time(t.clone())),
                _ => Err("no recognizable time".into()),
            })
            .on_success(move |value| {
                if let StepValue::Time(t) = value {
                    reminders.save_schedule(
                        &phone,
                        DoseSchedule {
                            medicine: medicine.clone(),
                            hours: vec![t.hour],
                        },
                    );
                }
                StepOutcome::Finish(FlowOutcome::Completed)
            })
            .on_failure(RetryPolicy::bounded(
                2,
                "schedule.time.retry",
                StepOutcome::Finish(FlowOutcome::Fallback),
            )),
    )
}
