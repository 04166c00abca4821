//! # Checkout Orchestrator
//!
//! Sequences cart, intent, tokenization, charge execution, and enrollment
//! hand-off, owning the only place side-effect ordering matters. The
//! orchestrator holds the current phase, the live intent, and the
//! idempotency key of the in-flight attempt: the key is replaced only when
//! a new token is minted, and an unknown-outcome network failure keeps
//! both the key and the charge request so the identical submission can be
//! resent without risking a duplicate charge.

use crate::phase::{BeginOutcome, CheckoutPhase, FailureKind, SubmitOutcome};
use checkout_core::{
    Cart, CardDetails, ChargeRequest, CheckoutError, CheckoutResult, ContactDetails,
    IdempotencyKey, PaymentIntent, PaymentReceipt, PaymentStatus, RetryDisposition,
    SharedCardTokenizer, SharedEnrollmentSink, SharedIntentService, SharedPaymentExecutor,
    TokenError,
};
use chrono::{Datelike, Utc};
use tracing::{info, instrument, warn};

/// The checkout state machine.
///
/// Owns the cart for the duration of one checkout and is the only
/// component permitted to call `cart.clear()`, and only after a
/// `PaymentStatus::Approved` receipt.
pub struct CheckoutOrchestrator {
    intents: SharedIntentService,
    tokenizer: SharedCardTokenizer,
    executor: SharedPaymentExecutor,
    enrollments: SharedEnrollmentSink,
    cart: Cart,

    phase: CheckoutPhase,
    intent: Option<PaymentIntent>,
    /// Key of the current logical attempt. Cleared only when the token is
    /// replaced (rejection, validation failure), never by generic error
    /// handling.
    attempt_key: Option<IdempotencyKey>,
    /// The exact submission to resend on an unknown-outcome failure
    in_flight: Option<ChargeRequest>,
    pending_payment: Option<String>,
    last_error: Option<CheckoutError>,
}

impl CheckoutOrchestrator {
    pub fn new(
        cart: Cart,
        intents: SharedIntentService,
        tokenizer: SharedCardTokenizer,
        executor: SharedPaymentExecutor,
        enrollments: SharedEnrollmentSink,
    ) -> Self {
        Self {
            intents,
            tokenizer,
            executor,
            enrollments,
            cart,
            phase: CheckoutPhase::Idle,
            intent: None,
            attempt_key: None,
            in_flight: None,
            pending_payment: None,
            last_error: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// The live intent, if one exists. Its `total` and `line_items` are
    /// rendered verbatim.
    pub fn intent(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    /// Server-issued total, formatted. The only arithmetic applied is
    /// display formatting.
    pub fn displayed_total(&self) -> Option<String> {
        self.intent.as_ref().map(|i| i.total.display())
    }

    /// The payment id of an unresolved `pending` charge
    pub fn pending_payment(&self) -> Option<&str> {
        self.pending_payment.as_deref()
    }

    /// Error behind the most recent failure, for the UI message
    pub fn last_error(&self) -> Option<&CheckoutError> {
        self.last_error.as_ref()
    }

    /// Whether the pay action should be enabled
    pub fn can_submit(&self) -> bool {
        self.phase.can_submit() && self.intent.is_some()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Enter checkout: price the cart into an intent and make the
    /// tokenization provider callable.
    ///
    /// An empty cart never enters the state machine; callers should leave
    /// checkout on [`BeginOutcome::RedirectToCatalog`]. A missing provider
    /// key fails before `CreatingIntent`; there is no degraded entry.
    #[instrument(skip(self))]
    pub async fn begin(&mut self) -> CheckoutResult<BeginOutcome> {
        if !self.phase.can_begin() {
            return Err(CheckoutError::InvalidPhase(format!(
                "begin from {:?}",
                self.phase
            )));
        }

        if self.cart.is_empty() {
            info!("Cart is empty, leaving checkout");
            return Ok(BeginOutcome::RedirectToCatalog);
        }

        if !self.tokenizer.is_configured() {
            return Err(self.fail(
                TokenError::NotConfigured("tokenization public key is missing".to_string()).into(),
            ));
        }

        self.phase = CheckoutPhase::CreatingIntent;
        self.last_error = None;

        let intent = match self.intents.create_intent(&self.cart.course_ids()).await {
            Ok(intent) => intent,
            Err(e) => return Err(self.fail(e.into())),
        };

        // Card entry opens only once the provider is actually callable.
        if let Err(e) = self.tokenizer.ensure_ready().await {
            return Err(self.fail(e.into()));
        }

        info!(intent_id = %intent.id, "Checkout ready, total {}", intent.total.display());
        self.intent = Some(intent);
        self.phase = CheckoutPhase::AwaitingCard;
        Ok(BeginOutcome::Ready)
    }

    /// Tokenize the card and submit the charge.
    ///
    /// Input errors are caught before any network call. A fresh token gets
    /// a fresh idempotency key: a new token is a logically distinct
    /// payment attempt. An intent that is no longer usable (expired, or
    /// already terminal) is re-created from the current cart first, so a
    /// slow or repeatedly rejected checkout never charges a stale intent.
    #[instrument(skip(self, contact, card))]
    pub async fn submit(
        &mut self,
        contact: &ContactDetails,
        card: &CardDetails,
    ) -> CheckoutResult<SubmitOutcome> {
        if !self.can_submit() {
            return Err(CheckoutError::InvalidPhase(format!(
                "submit from {:?}",
                self.phase
            )));
        }
        let usable = match self.intent.as_ref() {
            Some(intent) => intent.is_usable(),
            None => {
                return Err(CheckoutError::InvalidPhase(
                    "submit without an intent".to_string(),
                ))
            }
        };
        if !usable {
            self.refresh_intent().await?;
        }
        // refresh_intent always leaves an intent behind on Ok.
        let intent_id = match self.intent.as_ref() {
            Some(intent) => intent.id.clone(),
            None => {
                return Err(CheckoutError::InvalidPhase(
                    "submit without an intent".to_string(),
                ))
            }
        };

        if let Err(message) = contact.validate() {
            return Err(self.fail(CheckoutError::Input(message)));
        }
        let now = Utc::now();
        if let Err(e) = card.validate(now.month() as u8, now.year() as u16) {
            return Err(self.fail(e.into()));
        }

        self.phase = CheckoutPhase::Tokenizing;
        self.last_error = None;

        let token = match self.tokenizer.tokenize(card).await {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e.into())),
        };

        // New token, new logical attempt, new key.
        self.attempt_key = Some(IdempotencyKey::new());
        self.in_flight = Some(ChargeRequest::new(intent_id, token));
        self.phase = CheckoutPhase::Submitting;

        self.execute_attempt().await
    }

    /// Resend the in-flight submission after an unknown-outcome failure.
    ///
    /// Reuses the identical charge request and idempotency key, so the
    /// backend collapses this into the original attempt.
    #[instrument(skip(self))]
    pub async fn retry_submission(&mut self) -> CheckoutResult<SubmitOutcome> {
        if self.phase != CheckoutPhase::Failed(FailureKind::UnknownOutcome) {
            return Err(CheckoutError::InvalidPhase(format!(
                "retry_submission from {:?}",
                self.phase
            )));
        }
        if self.in_flight.is_none() || self.attempt_key.is_none() {
            return Err(CheckoutError::InvalidPhase(
                "no in-flight submission to retry".to_string(),
            ));
        }

        self.phase = CheckoutPhase::Submitting;
        self.execute_attempt().await
    }

    /// Poll an unresolved `pending` charge.
    ///
    /// A failed poll leaves the phase untouched (the charge is still
    /// pending as far as anyone knows) but is recorded as the latest
    /// error so the UI can surface it.
    #[instrument(skip(self))]
    pub async fn resolve_pending(&mut self) -> CheckoutResult<SubmitOutcome> {
        if self.phase != CheckoutPhase::PendingConfirmation {
            return Err(CheckoutError::InvalidPhase(format!(
                "resolve_pending from {:?}",
                self.phase
            )));
        }
        let payment_id = match self.pending_payment.clone() {
            Some(id) => id,
            None => {
                return Err(CheckoutError::InvalidPhase(
                    "no pending payment to resolve".to_string(),
                ))
            }
        };

        match self.executor.fetch_status(&payment_id).await {
            Ok(receipt) => self.apply_receipt(receipt).await,
            Err(e) => {
                warn!("Status poll failed, charge still pending: {}", e);
                let err: CheckoutError = e.into();
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Abandon the checkout. Always safe before `Succeeded`: the backend
    /// owns the charge lifecycle and intents expire passively, so only
    /// in-memory state needs discarding. The cart is left untouched.
    pub fn cancel(&mut self) {
        if self.phase == CheckoutPhase::Succeeded {
            return;
        }
        self.discard_attempt();
        self.intent = None;
        self.pending_payment = None;
        self.last_error = None;
        self.phase = CheckoutPhase::Idle;
    }

    /// Replace a no-longer-usable intent with a fresh one priced from the
    /// current cart. The previous intent id is never charged again.
    async fn refresh_intent(&mut self) -> CheckoutResult<()> {
        info!("Intent is no longer usable, requesting a fresh one");
        self.phase = CheckoutPhase::CreatingIntent;

        let intent = match self.intents.create_intent(&self.cart.course_ids()).await {
            Ok(intent) => intent,
            Err(e) => return Err(self.fail(e.into())),
        };

        info!(intent_id = %intent.id, "Fresh intent issued, total {}", intent.total.display());
        self.intent = Some(intent);
        self.phase = CheckoutPhase::AwaitingCard;
        Ok(())
    }

    async fn execute_attempt(&mut self) -> CheckoutResult<SubmitOutcome> {
        let request = match self.in_flight.clone() {
            Some(request) => request,
            None => {
                return Err(CheckoutError::InvalidPhase(
                    "no charge request prepared".to_string(),
                ))
            }
        };
        let key = match self.attempt_key.clone() {
            Some(key) => key,
            None => {
                return Err(CheckoutError::InvalidPhase(
                    "no idempotency key for this attempt".to_string(),
                ))
            }
        };

        match self.executor.execute(&request, &key).await {
            Ok(receipt) => self.apply_receipt(receipt).await,
            Err(e) => Err(self.fail(e.into())),
        }
    }

    async fn apply_receipt(&mut self, receipt: PaymentReceipt) -> CheckoutResult<SubmitOutcome> {
        match receipt.status {
            PaymentStatus::Approved => {
                // Hand-off is confirmed before the cart is cleared: if the
                // hand-off fails the selection must survive for recovery.
                if let Err(message) = self.enrollments.enroll(&receipt.enrollment_ids).await {
                    return Err(self.fail(CheckoutError::Enrollment(message)));
                }
                self.cart.clear();
                self.discard_attempt();
                self.pending_payment = None;
                self.phase = CheckoutPhase::Succeeded;
                info!(payment_id = %receipt.payment_id, "Payment approved, checkout complete");
                Ok(SubmitOutcome::Completed {
                    payment_id: receipt.payment_id,
                    enrollment_ids: receipt.enrollment_ids,
                })
            }
            PaymentStatus::Rejected => {
                // The token is spent and this attempt is over; the next
                // submission mints a new token and a new key.
                warn!(payment_id = %receipt.payment_id, "Payment rejected, returning to card entry");
                self.discard_attempt();
                self.pending_payment = None;
                self.phase = CheckoutPhase::AwaitingCard;
                Ok(SubmitOutcome::Declined {
                    payment_id: receipt.payment_id,
                })
            }
            PaymentStatus::Pending => {
                // Keep the key: no submission of any kind may start until
                // this charge resolves.
                info!(payment_id = %receipt.payment_id, "Payment pending confirmation");
                self.pending_payment = Some(receipt.payment_id.clone());
                self.phase = CheckoutPhase::PendingConfirmation;
                Ok(SubmitOutcome::Processing {
                    payment_id: receipt.payment_id,
                })
            }
        }
    }

    /// Record a failure and move to the phase its disposition demands
    fn fail(&mut self, err: CheckoutError) -> CheckoutError {
        match err.disposition() {
            RetryDisposition::RetrySameAttempt => {
                // Keep the key and the charge request untouched.
                self.phase = CheckoutPhase::Failed(FailureKind::UnknownOutcome);
            }
            RetryDisposition::NewCard => {
                self.discard_attempt();
                self.phase = CheckoutPhase::AwaitingCard;
            }
            RetryDisposition::AmendCart => {
                self.discard_attempt();
                self.intent = None;
                self.phase = CheckoutPhase::Failed(FailureKind::Recoverable);
            }
            RetryDisposition::Fatal => {
                self.discard_attempt();
                self.phase = CheckoutPhase::Failed(FailureKind::Fatal);
            }
        }
        self.last_error = Some(err.clone());
        err
    }

    /// Drop the token and key of the current attempt
    fn discard_attempt(&mut self) {
        self.in_flight = None;
        self.attempt_key = None;
    }
}
