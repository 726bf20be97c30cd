use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::cart::CartLine;
use crate::domain::checkout::CheckoutDetails;
use crate::domain::errors::{CartError, CheckoutError, PaymentError};
use crate::domain::order::{Order, OrderStatus, PaymentStatus};
use crate::domain::payment::{FlowState, PaymentFlow, PaymentMethod, OTP_TTL_SECS};
use crate::domain::ports::{
    CartStore, CatalogStore, NotificationDispatcher, OrderStore, OrderSummary,
};

use super::cart::CartManager;

/// How an issued code reached the buyer. When the notification
/// collaborator is down the code is surfaced through the flow itself so
/// checkout can still complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeDispatch {
    Sent { destination: String },
    Fallback { code: String },
}

/// What the buyer sees after order submission. Always success-shaped;
/// `persisted` records whether the order store accepted the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: String,
    pub amount: i64,
    pub persisted: bool,
}

/// One buyer's session: the cart, the captured checkout details, and
/// the active payment flow. Constructed at session start (restoring the
/// persisted cart) and torn down at session end; no state is shared
/// across sessions.
pub struct StorefrontSession {
    cart: CartManager,
    details: Option<CheckoutDetails>,
    flow: PaymentFlow,
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    rng: StdRng,
    otp_ttl: Duration,
}

impl StorefrontSession {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        cart_store: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let otp_ttl = Duration::seconds(OTP_TTL_SECS);
        Self {
            cart: CartManager::restore(catalog, cart_store),
            details: None,
            flow: PaymentFlow::with_ttl(otp_ttl),
            orders,
            notifier,
            rng: StdRng::from_entropy(),
            otp_ttl,
        }
    }

    /// Deterministic code generation, for tests and reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Override the code lifetime (the production default is 120 s).
    pub fn with_otp_ttl(mut self, ttl: Duration) -> Self {
        self.otp_ttl = ttl;
        self.flow = PaymentFlow::with_ttl(ttl);
        self
    }

    // ── Cart ─────────────────────────────────────────────────────────

    pub fn add_item(&mut self, product_id: &str) -> Result<(), CartError> {
        self.cart.add_item(product_id)
    }

    pub fn change_quantity(&mut self, product_id: &str, delta: i64) {
        self.cart.change_quantity(product_id, delta);
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.cart.remove_item(product_id);
    }

    pub fn cart_total(&self) -> i64 {
        self.cart.total()
    }

    pub fn cart_lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn cart_is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    // ── Checkout ─────────────────────────────────────────────────────

    /// Validate and capture the buyer's contact/address fields. Must
    /// succeed before a payment flow may start.
    pub fn begin_checkout(&mut self, details: CheckoutDetails) -> Result<(), CheckoutError> {
        details.validate()?;
        self.details = Some(details);
        Ok(())
    }

    pub fn checkout_details(&self) -> Option<&CheckoutDetails> {
        self.details.as_ref()
    }

    // ── Payment flow ─────────────────────────────────────────────────

    /// Enter method selection. Requires validated checkout details and
    /// a non-empty cart; rejected while another flow is in progress.
    pub fn start_payment(&mut self) -> Result<(), PaymentError> {
        match &self.details {
            Some(details) if details.validate().is_ok() => {}
            _ => return Err(PaymentError::DetailsMissing),
        }
        self.flow.begin(self.cart.is_empty())
    }

    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), PaymentError> {
        self.flow.select_method(method)
    }

    /// Confirm the chosen method, capturing the cart total at this
    /// instant as the charged amount.
    pub fn confirm_payment(&mut self) -> Result<PaymentMethod, PaymentError> {
        self.flow.confirm(self.cart.total())
    }

    /// Generate the one-time code, start its deadline, and dispatch it
    /// to the buyer's email. Dispatch failure does not abort the flow.
    pub fn issue_and_dispatch(&mut self, now: DateTime<Utc>) -> Result<CodeDispatch, PaymentError> {
        let code = self.flow.issue_code(&mut self.rng, now)?;
        Ok(self.dispatch(code))
    }

    /// Fresh code, fresh deadline, re-dispatched best-effort.
    pub fn resend_otp(&mut self, now: DateTime<Utc>) -> Result<CodeDispatch, PaymentError> {
        let code = self.flow.resend(&mut self.rng, now)?;
        Ok(self.dispatch(code))
    }

    fn dispatch(&mut self, code: String) -> CodeDispatch {
        let destination = self
            .details
            .as_ref()
            .map(|d| d.email.clone())
            .unwrap_or_default();
        match self.notifier.send_code(&destination, &code) {
            Ok(()) => {
                log::info!("OTP dispatched to {destination}");
                CodeDispatch::Sent { destination }
            }
            Err(e) => {
                log::warn!("OTP dispatch to {destination} failed ({e}), using in-flow fallback");
                CodeDispatch::Fallback { code }
            }
        }
    }

    /// Verify a submitted code. An exact match completes the flow and
    /// submits the order; a mismatch leaves the flow awaiting another
    /// attempt.
    pub fn verify_otp(
        &mut self,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<OrderReceipt, PaymentError> {
        self.flow.verify(submitted, now)?;
        Ok(self.submit_order(now))
    }

    /// Abort the flow before completion. The cart is untouched and no
    /// order is created; checkout details stay captured.
    pub fn cancel_payment(&mut self) -> Result<(), PaymentError> {
        self.flow.cancel()
    }

    pub fn flow_state(&self) -> FlowState {
        self.flow.state()
    }

    /// The active payment attempt, if any (method, captured amount,
    /// current code and deadline). Rendering is a projection of this.
    pub fn payment_session(&self) -> Option<&crate::domain::payment::PaymentSession> {
        self.flow.session()
    }

    pub fn flow_generation(&self) -> u64 {
        self.flow.generation()
    }

    pub fn awaiting_otp(&self) -> bool {
        self.flow.state() == FlowState::AwaitingOtp
    }

    /// Countdown hook; true when this call expired the code.
    pub fn expire_otp_if_due(&mut self, now: DateTime<Utc>) -> bool {
        self.flow.expire_if_due(now)
    }

    pub fn otp_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.flow.remaining(now)
    }

    // ── Order submission ─────────────────────────────────────────────

    /// Build the order snapshot, hand it to the persistence
    /// collaborator, and report success to the buyer regardless of the
    /// outcome (a failed save is logged, never surfaced). Clears the
    /// cart, resets the captured details and arms a fresh flow.
    fn submit_order(&mut self, now: DateTime<Utc>) -> OrderReceipt {
        // Flow just reached Success, so a session with method + amount
        // exists; fall back to cart totals only if it somehow does not.
        let (method, amount) = self
            .flow
            .session()
            .map(|s| (s.method, s.amount))
            .unwrap_or((PaymentMethod::Upi, self.cart.total()));
        let details = self.details.take().unwrap_or_default();

        let mut order = Order::from_checkout(&details, self.cart.lines(), method, amount, now);
        order.status = OrderStatus::Confirmed;
        order.payment_status = PaymentStatus::Completed;

        let receipt = match self.orders.save(&order) {
            Ok(id) => OrderReceipt {
                order_id: id.to_string(),
                amount,
                persisted: true,
            },
            Err(e) => {
                log::error!("Order save failed, reporting success with fallback id: {e}");
                OrderReceipt {
                    order_id: format!("DEMO-{}", now.timestamp_millis()),
                    amount,
                    persisted: false,
                }
            }
        };

        let summary = OrderSummary {
            order_id: receipt.order_id.clone(),
            amount,
            item_count: self.cart.lines().len(),
            customer_name: order.customer_name.clone(),
        };
        if let Err(e) = self
            .notifier
            .send_order_confirmation(&details.email, &summary)
        {
            log::warn!("Order confirmation dispatch failed: {e}");
        }

        self.cart.clear();
        self.flow = PaymentFlow::with_ttl(self.otp_ttl);
        log::info!(
            "Order {} placed for {} ({} {})",
            receipt.order_id,
            order.customer_name,
            amount,
            method.as_str()
        );
        receipt
    }
}
