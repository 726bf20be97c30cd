use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::errors::PaymentError;

use super::session::{CodeDispatch, StorefrontSession};

/// A buyer session shared between request handlers and the countdown
/// task. Locks are held only across individual synchronous transitions,
/// never across an await point.
pub type SharedSession = Arc<Mutex<StorefrontSession>>;

/// Pacing for the staged payment sequence. The init/dispatch delays are
/// cosmetic pacing inherited from the UI flow, not functional
/// requirements; tests zero them out.
#[derive(Debug, Clone, Copy)]
pub struct FlowTimings {
    /// Pause shown while the payment is "initializing".
    pub init_delay: Duration,
    /// Pause shown while the code is "being sent".
    pub dispatch_delay: Duration,
    /// Countdown resolution; the deadline is re-checked at this rate.
    pub tick: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            init_delay: Duration::from_secs(2),
            dispatch_delay: Duration::from_millis(1500),
            tick: Duration::from_secs(1),
        }
    }
}

fn lock(session: &SharedSession) -> Result<std::sync::MutexGuard<'_, StorefrontSession>, PaymentError> {
    // A poisoned lock means a handler panicked mid-transition; the flow
    // state can no longer be trusted.
    session.lock().map_err(|_| PaymentError::InvalidState)
}

/// Drive the staged sequence from a confirmed method to an issued code:
/// `MethodSelection → Initializing → (pacing) → AwaitingOtp`, then start
/// the expiry countdown. Returns how the code reached the buyer.
pub async fn run_payment(
    session: &SharedSession,
    timings: FlowTimings,
) -> Result<CodeDispatch, PaymentError> {
    lock(session)?.confirm_payment()?;
    tokio::time::sleep(timings.init_delay).await;
    tokio::time::sleep(timings.dispatch_delay).await;
    let dispatch = lock(session)?.issue_and_dispatch(Utc::now())?;
    spawn_countdown(Arc::clone(session), timings.tick);
    Ok(dispatch)
}

/// Re-issue the code and restart the countdown for the new deadline.
/// The previous countdown task notices the generation bump and exits.
pub async fn resend_code(
    session: &SharedSession,
    timings: FlowTimings,
) -> Result<CodeDispatch, PaymentError> {
    let dispatch = lock(session)?.resend_otp(Utc::now())?;
    spawn_countdown(Arc::clone(session), timings.tick);
    Ok(dispatch)
}

/// Recurring 1-second check of the code deadline. The task is tagged
/// with the flow generation it was started for and stops as soon as the
/// flow moves on (verification, resend, cancellation), so a stale timer
/// can never fire into a newer flow.
pub fn spawn_countdown(session: SharedSession, tick: Duration) -> JoinHandle<()> {
    let generation = match session.lock() {
        Ok(s) => s.flow_generation(),
        Err(_) => return tokio::spawn(async {}),
    };
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Ok(mut s) = session.lock() else { return };
            if s.flow_generation() != generation {
                // Superseded by a resend, cancellation or completion.
                return;
            }
            let now = Utc::now();
            if s.expire_otp_if_due(now) {
                log::info!("OTP expired, verification blocked until resend");
                return;
            }
            if !s.awaiting_otp() {
                return;
            }
            if let Some(remaining) = s.otp_remaining(now) {
                log::debug!("OTP expires in {}s", remaining.num_seconds());
            }
        }
    })
}
