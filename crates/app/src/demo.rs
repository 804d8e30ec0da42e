//! Scripted demo wiring.
//!
//! Canned Hindi utterances and a simulated SMS-code provider so the
//! binary can drive every flow end-to-end without vendor SDKs. The
//! recognizer replays one utterance list per listen cycle, in the order
//! the flow will open them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vaani_channel::mock::{final_after, partial_after, ScriptedRecognizer, ScriptedSynthesizer};
use vaani_otp::{CaptureResponse, CodeCaptureProvider};

/// Simulated out-of-band code delivery.
pub struct DemoCapture {
    available: bool,
    delivery: Option<(Duration, String)>,
}

impl DemoCapture {
    /// Capability present, code arrives after `after`.
    pub fn delivering(after: Duration, code: &str) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            delivery: Some((after, code.to_string())),
        })
    }

    /// Capability missing entirely; the chain arms its deadline alone.
    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            delivery: None,
        })
    }
}

#[async_trait]
impl CodeCaptureProvider for DemoCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request(&self) -> CaptureResponse {
        match &self.delivery {
            Some((after, code)) => {
                tokio::time::sleep(*after).await;
                CaptureResponse::Delivered(code.clone())
            }
            None => std::future::pending().await,
        }
    }

    fn stop(&self) {}
}

pub struct DemoRig {
    pub recognizer: Arc<ScriptedRecognizer>,
    pub synthesizer: Arc<ScriptedSynthesizer>,
    pub capture: Arc<DemoCapture>,
}

fn synthesizer() -> Arc<ScriptedSynthesizer> {
    // Roughly the pace of a short spoken sentence.
    ScriptedSynthesizer::new(Duration::from_millis(600))
}

/// Login: phone spoken digit-by-digit over two utterances; the code
/// arrives automatically before the deadline.
pub fn login_rig() -> DemoRig {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![
        partial_after(600, "नौ आठ"),
        final_after(300, "नौ आठ सात छह पाँच"),
        final_after(900, "चार तीन दो एक शून्य"),
    ]);
    DemoRig {
        recognizer,
        synthesizer: synthesizer(),
        capture: DemoCapture::delivering(Duration::from_millis(1500), "4821"),
    }
}

/// Registration: no capture capability, so the OTP comes in by voice,
/// then name and age.
pub fn registration_rig() -> DemoRig {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![
        final_after(600, "नौ आठ सात छह पाँच"),
        final_after(900, "चार तीन दो एक शून्य"),
    ]);
    recognizer.push_cycle(vec![final_after(700, "चार आठ दो एक")]);
    recognizer.push_cycle(vec![final_after(700, "आशा देवी")]);
    recognizer.push_cycle(vec![final_after(700, "पैंसठ")]);
    DemoRig {
        recognizer,
        synthesizer: synthesizer(),
        capture: DemoCapture::missing(),
    }
}

/// Schedule: declines the proposed hour, negotiates evening instead.
pub fn schedule_rig() -> DemoRig {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "जी नहीं")]);
    recognizer.push_cycle(vec![final_after(600, "शाम सात बजे")]);
    DemoRig {
        recognizer,
        synthesizer: synthesizer(),
        capture: DemoCapture::missing(),
    }
}

/// Alarm: confirms the dose was taken.
pub fn alarm_rig() -> DemoRig {
    let recognizer = ScriptedRecognizer::new();
    recognizer.push_cycle(vec![final_after(500, "हाँ ले ली")]);
    DemoRig {
        recognizer,
        synthesizer: synthesizer(),
        capture: DemoCapture::missing(),
    }
}
