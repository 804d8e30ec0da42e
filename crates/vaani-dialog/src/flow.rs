//! Declarative flow and step model.

use std::collections::HashMap;
use std::time::Duration;

use vaani_foundation::{Locale, TimeoutPolicy, TranscriptMode};
use vaani_parse::{
    clean_and_format_phone, parse_spoken_age, parse_spoken_number, parse_spoken_time_of_day,
    parse_yes_no, Affirmation, PhoneNumber, TimeOfDay,
};

/// Which parser a step applies to the committed transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Number,
    Phone,
    Age,
    YesNo,
    TimeOfDay,
    FreeText,
}

/// Parser output handed to a step's validator. Parsers are total, so
/// "nothing recognized" arrives as an empty string or `None`, never as
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Digits(String),
    Phone(PhoneNumber),
    YesNo(Option<Affirmation>),
    TimeOfDay(Option<TimeOfDay>),
    Text(String),
}

/// Validated value a step produces.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    Digits(String),
    Phone(PhoneNumber),
    Confirmation(Affirmation),
    Time(TimeOfDay),
    Text(String),
}

/// Where the flow goes after a step resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Advance to the named step.
    Next(String),
    /// End the flow.
    Finish(FlowOutcome),
}

/// How a flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    /// A retry budget ran out and the flow took its manual/default path.
    Fallback,
    /// Cancelled by the host (navigation away, shutdown).
    Cancelled,
}

/// Retry behavior when a step's validator rejects the input.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// `None` retries without bound; that is a per-flow choice, not an
    /// engine invariant.
    pub max_attempts: Option<u32>,
    /// Corrective prompt spoken before re-prompting the step.
    pub retry_prompt_key: Option<String>,
    /// Taken silently once attempts run out.
    pub on_exhausted: StepOutcome,
}

impl RetryPolicy {
    pub fn unbounded(retry_prompt_key: &str) -> Self {
        Self {
            max_attempts: None,
            retry_prompt_key: Some(retry_prompt_key.to_string()),
            on_exhausted: StepOutcome::Finish(FlowOutcome::Fallback),
        }
    }

    pub fn bounded(max_attempts: u32, retry_prompt_key: &str, on_exhausted: StepOutcome) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            retry_prompt_key: Some(retry_prompt_key.to_string()),
            on_exhausted,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(3),
            retry_prompt_key: None,
            on_exhausted: StepOutcome::Finish(FlowOutcome::Fallback),
        }
    }
}

type Validator = Box<dyn Fn(&ParsedValue) -> Result<StepValue, String> + Send + Sync>;
type SuccessHandler = Box<dyn Fn(&StepValue) -> StepOutcome + Send + Sync>;

/// One prompt → listen → parse → validate unit.
///
/// `validate` applies the step's business rules; `on_success` performs
/// the host's side effects (record writes live there, never inside the
/// engine) and names the next step, which is what makes branching flows
/// possible.
pub struct DialogStep {
    pub id: String,
    pub prompt_key: String,
    pub expects: ParserKind,
    pub validate: Validator,
    pub on_success: SuccessHandler,
    pub on_failure: RetryPolicy,
}

impl DialogStep {
    pub fn new(id: &str, prompt_key: &str, expects: ParserKind) -> Self {
        Self {
            id: id.to_string(),
            prompt_key: prompt_key.to_string(),
            expects,
            validate: Box::new(|parsed| match parsed {
                ParsedValue::Text(t) if !t.is_empty() => Ok(StepValue::Text(t.clone())),
                _ => Err("nothing recognized".to_string()),
            }),
            on_success: Box::new(|_| StepOutcome::Finish(FlowOutcome::Completed)),
            on_failure: RetryPolicy::default(),
        }
    }

    pub fn validate(
        mut self,
        f: impl Fn(&ParsedValue) -> Result<StepValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Box::new(f);
        self
    }

    pub fn on_success(
        mut self,
        f: impl Fn(&StepValue) -> StepOutcome + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Box::new(f);
        self
    }

    pub fn on_failure(mut self, policy: RetryPolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

/// Resolves prompt keys to localized text. Wording stays with the host;
/// lookups fall back to [`Locale::FALLBACK`].
pub trait PromptSource: Send + Sync {
    fn prompt(&self, locale: Locale, key: &str) -> String;
}

/// An ordered/branching set of dialog steps for one user task.
///
/// Timing policy and transcript mode are flow-wide, not per-step: a
/// registration flow is slow and accumulating everywhere, an in-app
/// command flow is quick and replacing everywhere.
pub struct Flow {
    pub id: String,
    pub entry: String,
    pub steps: HashMap<String, DialogStep>,
    pub policy: TimeoutPolicy,
    pub mode: TranscriptMode,
    pub locale: Locale,
    /// Auto-submit the buffer after this quiet period following any
    /// transcript update; independent of the channel's silence timer,
    /// first to fire wins.
    pub auto_advance: Option<Duration>,
}

impl Flow {
    pub fn new(id: &str, policy: TimeoutPolicy, mode: TranscriptMode, locale: Locale) -> Self {
        Self {
            id: id.to_string(),
            entry: String::new(),
            steps: HashMap::new(),
            policy,
            mode,
            locale,
            auto_advance: None,
        }
    }

    pub fn auto_advance(mut self, quiet: Duration) -> Self {
        self.auto_advance = Some(quiet);
        self
    }

    /// Add a step; the first one added becomes the entry step.
    pub fn step(mut self, step: DialogStep) -> Self {
        if self.entry.is_empty() {
            self.entry = step.id.clone();
        }
        self.steps.insert(step.id.clone(), step);
        self
    }
}

/// Apply a step's parser to the committed transcript.
pub fn apply_parser(kind: ParserKind, raw: &str, locale: Locale) -> ParsedValue {
    match kind {
        ParserKind::Number => ParsedValue::Digits(parse_spoken_number(raw, locale)),
        ParserKind::Age => ParsedValue::Digits(parse_spoken_age(raw, locale)),
        ParserKind::Phone => ParsedValue::Phone(clean_and_format_phone(raw, locale)),
        ParserKind::YesNo => ParsedValue::YesNo(parse_yes_no(raw, locale)),
        ParserKind::TimeOfDay => ParsedValue::TimeOfDay(parse_spoken_time_of_day(raw, locale)),
        ParserKind::FreeText => ParsedValue::Text(raw.trim().to_string()),
    }
}
