//! Application configuration.
//!
//! Loaded from an optional TOML file; every field has a default so a
//! bare install runs without one. CLI flags override the file.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use vaani_foundation::{Locale, TimeoutPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub locale: Locale,
    /// Long-form timing for registration-style flows.
    pub registration: TimeoutPolicy,
    /// Timing for quick in-app commands.
    pub command: TimeoutPolicy,
    /// Airlock window after a route/flow change.
    pub cooldown_ms: u64,
    /// Quiet period after a transcript update before auto-submitting.
    pub auto_advance_ms: u64,
    /// How long automatic OTP capture gets before voice fallback.
    pub otp_deadline_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Hi,
            registration: TimeoutPolicy::elder_friendly(),
            command: TimeoutPolicy::quick_command(),
            cooldown_ms: 750,
            auto_advance_ms: 2_000,
            otp_deadline_ms: 30_000,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    pub fn otp_deadline(&self) -> Duration {
        Duration::from_millis(self.otp_deadline_ms)
    }
}
