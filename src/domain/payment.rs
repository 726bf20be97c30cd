use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::errors::PaymentError;

/// Seconds an issued code stays valid before the flow expires.
pub const OTP_TTL_SECS: i64 = 120;

/// The closed set of payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Upi,
    Card,
    NetBanking,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::NetBanking => "netbanking",
            PaymentMethod::Wallet => "wallet",
        }
    }

    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        match s {
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            "netbanking" => Ok(PaymentMethod::NetBanking),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(PaymentError::UnknownMethod(other.to_string())),
        }
    }
}

/// Where the current one-time code stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpAttempt {
    NotSent,
    Sent,
    /// Last submission did not match; further attempts remain allowed
    /// until expiry.
    Errored,
    Verified,
    Expired,
    Cancelled,
}

/// Payment flow states. `Success` is terminal; `Failed` means the code
/// expired and only a resend can continue; `Cancelled` behaves like
/// `Idle` for restarting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    MethodSelection,
    Initializing,
    AwaitingOtp,
    Verifying,
    Success,
    Failed,
    Cancelled,
}

/// Snapshot of one payment attempt: the chosen method, the amount
/// captured when the method was confirmed (concurrent cart edits do not
/// change it), and the current code with its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub method: PaymentMethod,
    pub amount: i64,
    pub code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub attempt: OtpAttempt,
}

/// Draw a uniform 6-digit code from [100000, 999999].
pub fn generate_otp<R: Rng>(rng: &mut R) -> String {
    rng.gen_range(100_000..=999_999).to_string()
}

/// The payment/OTP state machine for one checkout attempt.
///
/// All transitions are synchronous and take `now` explicitly; pacing
/// delays and the 1-second countdown live with the caller. The
/// `generation` counter advances whenever an existing countdown must
/// stop tracking this flow (new code issued, expiry, cancellation), so
/// a stale timer can detect that it has been superseded.
#[derive(Debug)]
pub struct PaymentFlow {
    state: FlowState,
    pending_method: Option<PaymentMethod>,
    session: Option<PaymentSession>,
    pending_code: Option<String>,
    otp_ttl: Duration,
    generation: u64,
}

impl Default for PaymentFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentFlow {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(OTP_TTL_SECS))
    }

    pub fn with_ttl(otp_ttl: Duration) -> Self {
        Self {
            state: FlowState::Idle,
            pending_method: None,
            session: None,
            pending_code: None,
            otp_ttl,
            generation: 0,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn session(&self) -> Option<&PaymentSession> {
        self.session.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a started flow has not yet resolved; starting another
    /// flow is rejected for the duration.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self.state,
            FlowState::Initializing | FlowState::AwaitingOtp | FlowState::Verifying
        )
    }

    /// `Idle → MethodSelection`. Requires a non-empty cart; rejected
    /// while another flow is in progress or after completion. Resets any
    /// previously selected method.
    pub fn begin(&mut self, cart_is_empty: bool) -> Result<(), PaymentError> {
        if self.is_in_progress() || self.state == FlowState::Success {
            return Err(PaymentError::FlowInProgress);
        }
        if cart_is_empty {
            return Err(PaymentError::EmptyCart);
        }
        self.state = FlowState::MethodSelection;
        self.pending_method = None;
        self.session = None;
        self.pending_code = None;
        self.generation += 1;
        Ok(())
    }

    /// Record the chosen method; may be changed until confirmed.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), PaymentError> {
        if self.state != FlowState::MethodSelection {
            return Err(PaymentError::InvalidState);
        }
        self.pending_method = Some(method);
        Ok(())
    }

    /// `MethodSelection → Initializing`. Captures `amount` as the
    /// charged total; it is not re-read later.
    pub fn confirm(&mut self, amount: i64) -> Result<PaymentMethod, PaymentError> {
        if self.state != FlowState::MethodSelection {
            return Err(PaymentError::InvalidState);
        }
        let method = self.pending_method.ok_or(PaymentError::NoMethodSelected)?;
        self.session = Some(PaymentSession {
            method,
            amount,
            code: None,
            expires_at: None,
            attempt: OtpAttempt::NotSent,
        });
        self.state = FlowState::Initializing;
        Ok(method)
    }

    /// `Initializing → AwaitingOtp`. Generates the one-time code and
    /// starts the expiry deadline; the caller dispatches the returned
    /// code to the buyer.
    pub fn issue_code<R: Rng>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<String, PaymentError> {
        if self.state != FlowState::Initializing {
            return Err(PaymentError::InvalidState);
        }
        let session = self.session.as_mut().ok_or(PaymentError::InvalidState)?;
        let code = generate_otp(rng);
        session.code = Some(code.clone());
        session.expires_at = Some(now + self.otp_ttl);
        session.attempt = OtpAttempt::Sent;
        self.state = FlowState::AwaitingOtp;
        self.generation += 1;
        Ok(code)
    }

    /// `AwaitingOtp → Verifying`. Rejects malformed codes without
    /// consuming an attempt, submissions after expiry, and a second
    /// submission while one is still in flight.
    pub fn submit_code(&mut self, submitted: &str, now: DateTime<Utc>) -> Result<(), PaymentError> {
        match self.state {
            FlowState::Verifying => return Err(PaymentError::VerificationInFlight),
            FlowState::Failed => return Err(PaymentError::OtpExpired),
            FlowState::AwaitingOtp => {}
            _ => return Err(PaymentError::InvalidState),
        }
        if self.expire_if_due(now) {
            return Err(PaymentError::OtpExpired);
        }
        if submitted.len() != 6 || !submitted.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::MalformedCode);
        }
        self.pending_code = Some(submitted.to_string());
        self.state = FlowState::Verifying;
        Ok(())
    }

    /// `Verifying → Success | AwaitingOtp`. Exact string comparison
    /// against the last generated code; a mismatch returns the flow to
    /// `AwaitingOtp` with the attempt flagged errored, leaving retries
    /// open until expiry.
    pub fn resolve_verification(&mut self) -> Result<(), PaymentError> {
        if self.state != FlowState::Verifying {
            return Err(PaymentError::InvalidState);
        }
        let submitted = self.pending_code.take().ok_or(PaymentError::InvalidState)?;
        let session = self.session.as_mut().ok_or(PaymentError::InvalidState)?;
        if session.code.as_deref() == Some(submitted.as_str()) {
            session.attempt = OtpAttempt::Verified;
            self.state = FlowState::Success;
            self.generation += 1;
            Ok(())
        } else {
            session.attempt = OtpAttempt::Errored;
            self.state = FlowState::AwaitingOtp;
            Err(PaymentError::OtpMismatch)
        }
    }

    /// Submit and resolve in one step. Only one verification outcome is
    /// produced per submitted code.
    pub fn verify(&mut self, submitted: &str, now: DateTime<Utc>) -> Result<(), PaymentError> {
        self.submit_code(submitted, now)?;
        self.resolve_verification()
    }

    /// Countdown hook: `AwaitingOtp → Failed` once the deadline passes.
    /// Returns true when this call performed the expiry transition.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != FlowState::AwaitingOtp {
            return false;
        }
        let due = self
            .session
            .as_ref()
            .and_then(|s| s.expires_at)
            .is_some_and(|deadline| now >= deadline);
        if due {
            if let Some(session) = self.session.as_mut() {
                session.attempt = OtpAttempt::Expired;
            }
            self.state = FlowState::Failed;
            self.generation += 1;
        }
        due
    }

    /// Time left on the current code, for the 1-second UI countdown.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.state != FlowState::AwaitingOtp {
            return None;
        }
        let deadline = self.session.as_ref()?.expires_at?;
        Some((deadline - now).max(Duration::zero()))
    }

    /// Issue a fresh code with a fresh deadline. Allowed while awaiting
    /// a code or after expiry; the caller re-dispatches the result.
    pub fn resend<R: Rng>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<String, PaymentError> {
        let expired = self.state == FlowState::Failed
            && self
                .session
                .as_ref()
                .is_some_and(|s| s.attempt == OtpAttempt::Expired);
        if self.state != FlowState::AwaitingOtp && !expired {
            return Err(PaymentError::InvalidState);
        }
        let session = self.session.as_mut().ok_or(PaymentError::InvalidState)?;
        let code = generate_otp(rng);
        session.code = Some(code.clone());
        session.expires_at = Some(now + self.otp_ttl);
        session.attempt = OtpAttempt::Sent;
        self.state = FlowState::AwaitingOtp;
        self.pending_code = None;
        self.generation += 1;
        Ok(code)
    }

    /// Abort at any point before `Success`. Tears down the countdown
    /// (via the generation bump) and leaves the cart untouched.
    pub fn cancel(&mut self) -> Result<(), PaymentError> {
        if self.state == FlowState::Success {
            return Err(PaymentError::InvalidState);
        }
        if let Some(session) = self.session.as_mut() {
            session.attempt = OtpAttempt::Cancelled;
        }
        self.state = FlowState::Cancelled;
        self.pending_method = None;
        self.pending_code = None;
        self.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    /// Drive a flow to AwaitingOtp and return the issued code.
    fn armed_flow(rng: &mut StdRng) -> (PaymentFlow, String) {
        let mut flow = PaymentFlow::new();
        flow.begin(false).unwrap();
        flow.select_method(PaymentMethod::Upi).unwrap();
        flow.confirm(3499).unwrap();
        let code = flow.issue_code(rng, t0()).unwrap();
        (flow, code)
    }

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        let mut r = rng();
        for _ in 0..1000 {
            let code = generate_otp(&mut r);
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn begin_with_empty_cart_rejected() {
        let mut flow = PaymentFlow::new();
        assert_eq!(flow.begin(true), Err(PaymentError::EmptyCart));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn begin_while_in_progress_rejected() {
        let mut r = rng();
        let (mut flow, _) = armed_flow(&mut r);
        assert_eq!(flow.begin(false), Err(PaymentError::FlowInProgress));
    }

    #[test]
    fn confirm_without_method_rejected() {
        let mut flow = PaymentFlow::new();
        flow.begin(false).unwrap();
        assert_eq!(flow.confirm(100), Err(PaymentError::NoMethodSelected));
    }

    #[test]
    fn cannot_verify_before_code_issued() {
        let mut flow = PaymentFlow::new();
        flow.begin(false).unwrap();
        flow.select_method(PaymentMethod::Card).unwrap();
        flow.confirm(100).unwrap();
        assert_eq!(
            flow.verify("123456", t0()),
            Err(PaymentError::InvalidState)
        );
        assert_ne!(flow.state(), FlowState::Success);
    }

    #[test]
    fn exact_match_reaches_success() {
        let mut r = rng();
        let (mut flow, code) = armed_flow(&mut r);
        flow.verify(&code, t0() + Duration::seconds(10)).unwrap();
        assert_eq!(flow.state(), FlowState::Success);
        assert_eq!(flow.session().unwrap().attempt, OtpAttempt::Verified);
    }

    #[test]
    fn mismatch_stays_awaiting_and_allows_retry() {
        let mut r = rng();
        let (mut flow, code) = armed_flow(&mut r);
        assert_eq!(
            flow.verify("000000", t0()),
            Err(PaymentError::OtpMismatch)
        );
        assert_eq!(flow.state(), FlowState::AwaitingOtp);
        assert_eq!(flow.session().unwrap().attempt, OtpAttempt::Errored);
        // Unlimited retries until expiry.
        assert_eq!(flow.verify("111111", t0()), Err(PaymentError::OtpMismatch));
        flow.verify(&code, t0()).unwrap();
        assert_eq!(flow.state(), FlowState::Success);
    }

    #[test]
    fn malformed_code_rejected_without_state_change() {
        let mut r = rng();
        let (mut flow, _) = armed_flow(&mut r);
        assert_eq!(flow.verify("12345", t0()), Err(PaymentError::MalformedCode));
        assert_eq!(flow.verify("12a456", t0()), Err(PaymentError::MalformedCode));
        assert_eq!(flow.state(), FlowState::AwaitingOtp);
        assert_eq!(flow.session().unwrap().attempt, OtpAttempt::Sent);
    }

    #[test]
    fn amount_is_snapshotted_at_confirm() {
        let mut r = rng();
        let (flow, _) = armed_flow(&mut r);
        assert_eq!(flow.session().unwrap().amount, 3499);
    }

    #[test]
    fn verification_after_deadline_expires_flow() {
        let mut r = rng();
        let (mut flow, code) = armed_flow(&mut r);
        let late = t0() + Duration::seconds(OTP_TTL_SECS);
        assert_eq!(flow.verify(&code, late), Err(PaymentError::OtpExpired));
        assert_eq!(flow.state(), FlowState::Failed);
        assert_eq!(flow.session().unwrap().attempt, OtpAttempt::Expired);
        // Still blocked until a resend, even with the right code.
        assert_eq!(flow.verify(&code, late), Err(PaymentError::OtpExpired));
    }

    #[test]
    fn countdown_tick_expires_at_deadline() {
        let mut r = rng();
        let (mut flow, _) = armed_flow(&mut r);
        assert!(!flow.expire_if_due(t0() + Duration::seconds(119)));
        assert_eq!(flow.state(), FlowState::AwaitingOtp);
        assert!(flow.expire_if_due(t0() + Duration::seconds(120)));
        assert_eq!(flow.state(), FlowState::Failed);
    }

    #[test]
    fn remaining_counts_down_and_clamps_at_zero() {
        let mut r = rng();
        let (flow, _) = armed_flow(&mut r);
        assert_eq!(
            flow.remaining(t0() + Duration::seconds(30)),
            Some(Duration::seconds(90))
        );
        assert_eq!(
            flow.remaining(t0() + Duration::seconds(500)),
            Some(Duration::zero())
        );
    }

    #[test]
    fn resend_after_expiry_issues_fresh_code_and_deadline() {
        let mut r = rng();
        let (mut flow, old_code) = armed_flow(&mut r);
        let late = t0() + Duration::seconds(200);
        flow.expire_if_due(late);
        let new_code = flow.resend(&mut r, late).unwrap();
        assert_eq!(flow.state(), FlowState::AwaitingOtp);
        assert_eq!(
            flow.session().unwrap().expires_at,
            Some(late + Duration::seconds(OTP_TTL_SECS))
        );
        // The old code is dead once a new one is issued.
        if old_code != new_code {
            assert_eq!(flow.verify(&old_code, late), Err(PaymentError::OtpMismatch));
        }
        flow.verify(&new_code, late + Duration::seconds(1)).unwrap();
        assert_eq!(flow.state(), FlowState::Success);
    }

    #[test]
    fn resend_bumps_generation_for_stale_timers() {
        let mut r = rng();
        let (mut flow, _) = armed_flow(&mut r);
        let before = flow.generation();
        flow.resend(&mut r, t0()).unwrap();
        assert!(flow.generation() > before);
    }

    #[test]
    fn concurrent_submission_rejected_while_in_flight() {
        let mut r = rng();
        let (mut flow, code) = armed_flow(&mut r);
        flow.submit_code(&code, t0()).unwrap();
        assert_eq!(
            flow.submit_code(&code, t0()),
            Err(PaymentError::VerificationInFlight)
        );
        flow.resolve_verification().unwrap();
        assert_eq!(flow.state(), FlowState::Success);
    }

    #[test]
    fn cancel_tears_down_and_allows_restart() {
        let mut r = rng();
        let (mut flow, _) = armed_flow(&mut r);
        let before = flow.generation();
        flow.cancel().unwrap();
        assert_eq!(flow.state(), FlowState::Cancelled);
        assert_eq!(flow.session().unwrap().attempt, OtpAttempt::Cancelled);
        assert!(flow.generation() > before);
        flow.begin(false).unwrap();
        assert_eq!(flow.state(), FlowState::MethodSelection);
        assert!(flow.session().is_none());
    }

    #[test]
    fn cancel_after_success_rejected() {
        let mut r = rng();
        let (mut flow, code) = armed_flow(&mut r);
        flow.verify(&code, t0()).unwrap();
        assert_eq!(flow.cancel(), Err(PaymentError::InvalidState));
    }

    #[test]
    fn method_can_be_reselected_before_confirm() {
        let mut flow = PaymentFlow::new();
        flow.begin(false).unwrap();
        flow.select_method(PaymentMethod::Card).unwrap();
        flow.select_method(PaymentMethod::Upi).unwrap();
        assert_eq!(flow.confirm(500).unwrap(), PaymentMethod::Upi);
    }

    #[test]
    fn method_parse_round_trips_closed_set() {
        for method in [
            PaymentMethod::Upi,
            PaymentMethod::Card,
            PaymentMethod::NetBanking,
            PaymentMethod::Wallet,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()).unwrap(), method);
        }
        assert!(matches!(
            PaymentMethod::parse("cheque"),
            Err(PaymentError::UnknownMethod(_))
        ));
    }
}
