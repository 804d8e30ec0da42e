//! One-time-code acquisition with progressive fallback.
//!
//! A [`CredentialCaptureChain`] races an automatic out-of-band capture
//! mechanism (programmatic SMS code retrieval, when the platform has
//! it) against a fixed deadline. Deadline expiry is the sole trigger
//! that hands control to a voice-driven fallback, and automatic capture
//! is stopped the instant fallback begins so a late delivery can never
//! overwrite a code the user is actively reading aloud.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A short numeric one-time code.
pub type Code = String;

/// What an automatic capture request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResponse {
    Delivered(Code),
    /// The capability is missing on this platform.
    Unavailable,
    Failed(String),
}

/// Automatic out-of-band code retrieval.
#[async_trait]
pub trait CodeCaptureProvider: Send + Sync {
    /// Whether the platform has the capability at all.
    fn is_available(&self) -> bool;

    /// Wait for an out-of-band delivery. The chain bounds this with its
    /// own deadline; implementations may block indefinitely.
    async fn request(&self) -> CaptureResponse;

    /// Abort a pending request. Synchronous, idempotent.
    fn stop(&self);
}

/// Who resolved the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureWinner {
    Automatic,
    Voice,
    Timeout,
    Cancelled,
}

/// Ephemeral record of one code request. Created per request, resolved
/// exactly once, discarded afterwards.
#[derive(Debug)]
pub struct CaptureRace {
    deadline: Instant,
    winner: Mutex<Option<CaptureWinner>>,
}

impl CaptureRace {
    pub fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            winner: Mutex::new(None),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Record the winner. Only the first resolution sticks; the return
    /// value says whether this call won.
    pub fn resolve(&self, winner: CaptureWinner) -> bool {
        let mut slot = self.winner.lock();
        if slot.is_some() {
            debug!(target: "otp", attempted = ?winner, actual = ?*slot, "late race resolution ignored");
            return false;
        }
        *slot = Some(winner);
        true
    }

    pub fn winner(&self) -> Option<CaptureWinner> {
        *self.winner.lock()
    }
}

/// Cloneable cancellation handle for one acquisition.
#[derive(Clone, Default)]
pub struct CaptureCancel {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CaptureCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the acquisition. Not an error path: the caller navigated
    /// away or no longer needs the code.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    async fn cancelled(&self) {
        let notified = self.notify.notified();
        if self.flag.load(Ordering::SeqCst) {
            return;
        }
        notified.await;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The caller aborted; logged at debug only.
    #[error("code capture cancelled")]
    Cancelled,
    /// Neither automatic capture nor the voice fallback produced a code.
    #[error("code capture ended without a code")]
    TimedOut,
}

/// Timeout-bounded race between automatic capture and voice fallback.
pub struct CredentialCaptureChain {
    provider: Arc<dyn CodeCaptureProvider>,
}

impl CredentialCaptureChain {
    pub fn new(provider: Arc<dyn CodeCaptureProvider>) -> Self {
        Self { provider }
    }

    /// Acquire a code with the least user effort possible.
    ///
    /// `voice_fallback` is only invoked once the deadline expires (a
    /// platform without the capture capability arms the same deadline
    /// and behaves identically at expiry). Returns `Cancelled` if the
    /// handle fires first.
    pub async fn acquire<F, Fut>(
        &self,
        deadline: Duration,
        cancel: CaptureCancel,
        voice_fallback: F,
    ) -> Result<Code, CaptureError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Code>>,
    {
        let race = CaptureRace::new(Instant::now() + deadline);

        if self.provider.is_available() {
            info!(target: "otp", deadline_ms = deadline.as_millis() as u64, "automatic code capture started");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.provider.stop();
                    race.resolve(CaptureWinner::Cancelled);
                    debug!(target: "otp", "capture cancelled by caller");
                    return Err(CaptureError::Cancelled);
                }
                response = self.provider.request() => match response {
                    CaptureResponse::Delivered(code) => {
                        race.resolve(CaptureWinner::Automatic);
                        info!(target: "otp", "code captured automatically");
                        return Ok(code);
                    }
                    other => {
                        // The automatic path is gone; wait out the rest
                        // of the deadline so timing stays identical.
                        warn!(target: "otp", response = ?other, "automatic capture gave up early");
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                race.resolve(CaptureWinner::Cancelled);
                                return Err(CaptureError::Cancelled);
                            }
                            _ = tokio::time::sleep_until(race.deadline()) => {}
                        }
                    }
                },
                _ = tokio::time::sleep_until(race.deadline()) => {}
            }
        } else {
            info!(target: "otp", deadline_ms = deadline.as_millis() as u64, "no automatic capture capability; arming deadline only");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    race.resolve(CaptureWinner::Cancelled);
                    return Err(CaptureError::Cancelled);
                }
                _ = tokio::time::sleep_until(race.deadline()) => {}
            }
        }

        // Deadline expired. Stop automatic capture before the user
        // starts re-entering the code by voice.
        self.provider.stop();
        info!(target: "otp", "deadline expired, switching to voice fallback");
        match voice_fallback().await {
            Some(code) => {
                race.resolve(CaptureWinner::Voice);
                Ok(code)
            }
            None => {
                race.resolve(CaptureWinner::Timeout);
                Err(CaptureError::TimedOut)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedCapture {
        available: bool,
        delivery: Option<(Duration, Code)>,
        stopped: Arc<AtomicBool>,
        stopped_at: Arc<Mutex<Option<Instant>>>,
    }

    impl ScriptedCapture {
        fn delivering(after: Duration, code: &str) -> Arc<Self> {
            Arc::new(Self {
                available: true,
                delivery: Some((after, code.to_string())),
                stopped: Arc::new(AtomicBool::new(false)),
                stopped_at: Arc::new(Mutex::new(None)),
            })
        }

        fn silent() -> Arc<Self> {
            Arc::new(Self {
                available: true,
                delivery: None,
                stopped: Arc::new(AtomicBool::new(false)),
                stopped_at: Arc::new(Mutex::new(None)),
            })
        }

        fn missing() -> Arc<Self> {
            Arc::new(Self {
                available: false,
                delivery: None,
                stopped: Arc::new(AtomicBool::new(false)),
                stopped_at: Arc::new(Mutex::new(None)),
            })
        }
    }

    #[async_trait]
    impl CodeCaptureProvider for ScriptedCapture {
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

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
            *self.stopped_at.lock() = Some(Instant::now());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn automatic_delivery_wins_before_deadline() {
        let provider = ScriptedCapture::delivering(Duration::from_secs(1), "482913");
        let chain = CredentialCaptureChain::new(provider.clone());

        let code = chain
            .acquire(Duration::from_secs(5), CaptureCancel::new(), || async {
                panic!("fallback must not run")
            })
            .await
            .expect("code");
        assert_eq!(code, "482913");
        assert!(!provider.stopped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_starts_voice_fallback_and_stops_capture() {
        let provider = ScriptedCapture::silent();
        let chain = CredentialCaptureChain::new(provider.clone());
        let started_at = Instant::now();

        let fallback_at: Arc<Mutex<Option<Duration>>> = Arc::new(Mutex::new(None));
        let seen = fallback_at.clone();
        let stopped = provider.stopped.clone();

        let code = chain
            .acquire(Duration::from_millis(5000), CaptureCancel::new(), move || async move {
                // Automatic capture is already stopped when the voice
                // step begins.
                assert!(stopped.load(Ordering::SeqCst));
                *seen.lock() = Some(started_at.elapsed());
                Some("771204".to_string())
            })
            .await
            .expect("code");

        assert_eq!(code, "771204");
        assert_eq!(*fallback_at.lock(), Some(Duration::from_millis(5000)));
        assert_eq!(
            *provider.stopped_at.lock(),
            Some(started_at + Duration::from_millis(5000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn late_automatic_delivery_cannot_overwrite_voice_entry() {
        // Delivery would land at 6s, after the 5s deadline.
        let provider = ScriptedCapture::delivering(Duration::from_secs(6), "999999");
        let chain = CredentialCaptureChain::new(provider.clone());

        let code = chain
            .acquire(Duration::from_secs(5), CaptureCancel::new(), || async {
                Some("123456".to_string())
            })
            .await
            .expect("code");
        assert_eq!(code, "123456");
        assert!(provider.stopped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_capability_behaves_identically_at_expiry() {
        let provider = ScriptedCapture::missing();
        let chain = CredentialCaptureChain::new(provider.clone());
        let started_at = Instant::now();

        let code = chain
            .acquire(Duration::from_millis(5000), CaptureCancel::new(), move || async move {
                assert_eq!(started_at.elapsed(), Duration::from_millis(5000));
                Some("345678".to_string())
            })
            .await
            .expect("code");
        assert_eq!(code, "345678");
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cancellation_is_not_an_error_state() {
        let provider = ScriptedCapture::silent();
        let chain = CredentialCaptureChain::new(provider.clone());
        let cancel = CaptureCancel::new();

        let aborter = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                cancel.cancel();
            })
        };

        let result = chain
            .acquire(Duration::from_secs(30), cancel, || async {
                panic!("fallback must not run")
            })
            .await;
        aborter.await.expect("join");

        assert_eq!(result, Err(CaptureError::Cancelled));
        assert!(provider.stopped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_without_a_code_times_out() {
        let provider = ScriptedCapture::missing();
        let chain = CredentialCaptureChain::new(provider.clone());

        let result = chain
            .acquire(Duration::from_secs(5), CaptureCancel::new(), || async { None })
            .await;
        assert_eq!(result, Err(CaptureError::TimedOut));
    }

    #[test]
    fn race_resolves_exactly_once() {
        let race = CaptureRace::new(Instant::now());
        assert!(race.resolve(CaptureWinner::Timeout));
        assert!(!race.resolve(CaptureWinner::Automatic));
        assert!(!race.resolve(CaptureWinner::Voice));
        assert_eq!(race.winner(), Some(CaptureWinner::Timeout));
    }
}
