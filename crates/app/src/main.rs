use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use vaani_app::config::AppConfig;
use vaani_app::demo::{self, DemoRig};
use vaani_app::flows::alarm::run_alarm_response;
use vaani_app::flows::login::run_login;
use vaani_app::flows::registration::run_registration;
use vaani_app::flows::schedule::run_schedule_confirmation;
use vaani_app::prompts::PromptCatalog;
use vaani_app::records::{MemoryStore, ProfileStore, ReminderStore, UserProfile};
use vaani_channel::{ChannelConfig, SpeechChannel};
use vaani_dialog::ConversationEngine;
use vaani_foundation::Locale;
use vaani_otp::CredentialCaptureChain;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DemoKind {
    Login,
    Registration,
    Schedule,
    Alarm,
}

#[derive(Parser, Debug)]
#[command(name = "vaani", about = "Voice-first assistant demo flows", version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "VAANI_CONFIG")]
    config: Option<PathBuf>,

    /// Which flow to drive with scripted speech
    #[arg(long, value_enum, default_value_t = DemoKind::Login)]
    demo: DemoKind,

    /// Override locale (hi|en)
    #[arg(long, value_parser = parse_locale)]
    locale: Option<Locale>,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    match s {
        "hi" => Ok(Locale::Hi),
        "en" => Ok(Locale::En),
        other => Err(format!("unknown locale `{other}` (expected hi|en)")),
    }
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "vaani.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().map_err(|e| anyhow::anyhow!("logging init failed: {e}"))?;
    let cli = Cli::parse();

    let mut cfg = AppConfig::load(cli.config.as_deref())?;
    if let Some(locale) = cli.locale {
        cfg.locale = locale;
    }
    // Demo pacing: a 30s code-capture wait is unwatchable at a desk.
    cfg.otp_deadline_ms = cfg.otp_deadline_ms.min(3_000);

    let rig: DemoRig = match cli.demo {
        DemoKind::Login => demo::login_rig(),
        DemoKind::Registration => demo::registration_rig(),
        DemoKind::Schedule => demo::schedule_rig(),
        DemoKind::Alarm => demo::alarm_rig(),
    };

    let channel = Arc::new(SpeechChannel::new(
        rig.recognizer.clone(),
        rig.synthesizer.clone(),
        ChannelConfig {
            locale: cfg.locale,
            cooldown_ms: cfg.cooldown_ms,
            ..ChannelConfig::default()
        },
    )?);
    let engine = ConversationEngine::new(channel, Arc::new(PromptCatalog));
    let chain = CredentialCaptureChain::new(rig.capture.clone());

    let store = Arc::new(MemoryStore::new());
    let profiles: Arc<dyn ProfileStore> = store.clone();
    let reminders: Arc<dyn ReminderStore> = store.clone();

    match cli.demo {
        DemoKind::Login => {
            profiles.upsert(UserProfile {
                phone: "+919876543210".into(),
                name: "आशा देवी".into(),
                age: 67,
            });
            let outcome = run_login(&engine, &chain, &profiles, &cfg).await?;
            info!(target: "app", ?outcome, "login demo finished");
        }
        DemoKind::Registration => {
            let profile = run_registration(&engine, &chain, &profiles, &cfg).await?;
            info!(target: "app", ?profile, "registration demo finished");
        }
        DemoKind::Schedule => {
            let schedule = run_schedule_confirmation(
                &engine,
                &reminders,
                &cfg,
                "+919876543210",
                "मेटफॉर्मिन",
            )
            .await?;
            info!(target: "app", ?schedule, "schedule demo finished");
        }
        DemoKind::Alarm => {
            let action = run_alarm_response(&engine, &cfg).await?;
            info!(target: "app", ?action, "alarm demo finished");
        }
    }

    // Leaving the screen: reset the shared channel for whatever is next.
    engine.channel().on_context_switch();
    Ok(())
}
