//! # Service Traits
//!
//! The seams between the checkout orchestrator and its collaborators.
//! HTTP implementations live in `checkout-client`; the tokenization
//! provider implementation lives in `checkout-culqi`; tests supply mocks.

use crate::card::CardDetails;
use crate::error::{ExecutionError, IntentError, TokenError};
use crate::intent::PaymentIntent;
use crate::payment::{ChargeRequest, IdempotencyKey, PaymentReceipt, PaymentToken};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates priced, time-bounded payment intents on the backend.
///
/// The backend is the sole price authority: the request carries course ids
/// only, and the returned totals are rendered verbatim.
#[async_trait]
pub trait IntentService: Send + Sync {
    /// Create an intent for a non-empty set of course ids.
    ///
    /// Empty input fails fast with [`IntentError::EmptyCart`] before any
    /// network call.
    async fn create_intent(&self, course_ids: &[String]) -> Result<PaymentIntent, IntentError>;
}

/// Exchanges raw card fields for a single-use token, entirely within the
/// provider's trust boundary. Raw card data never touches the merchant
/// backend.
#[async_trait]
pub trait CardTokenizer: Send + Sync {
    /// Whether a provider public key is configured. Checkout must not
    /// start without one.
    fn is_configured(&self) -> bool;

    /// Make the provider callable, loading its script at most once
    /// process-wide. Idempotent under concurrent callers.
    async fn ensure_ready(&self) -> Result<(), TokenError>;

    /// Exchange validated card fields for a token
    async fn tokenize(&self, card: &CardDetails) -> Result<PaymentToken, TokenError>;
}

/// Submits a charge to the backend and reads back the tri-state result
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    /// Execute a charge. The idempotency key travels as a request
    /// attribute so the backend can collapse retries of the same logical
    /// attempt into one charge.
    async fn execute(
        &self,
        request: &ChargeRequest,
        key: &IdempotencyKey,
    ) -> Result<PaymentReceipt, ExecutionError>;

    /// Query the current state of a charge, used to resolve `pending`
    /// results and unknown-outcome network failures without resubmitting.
    async fn fetch_status(&self, payment_id: &str) -> Result<PaymentReceipt, ExecutionError>;
}

/// Receives enrollment ids after an approved payment. The orchestrator
/// never constructs or infers enrollment records itself.
#[async_trait]
pub trait EnrollmentSink: Send + Sync {
    async fn enroll(&self, enrollment_ids: &[String]) -> Result<(), String>;
}

/// Shared handles, the usual way these traits are passed around
pub type SharedIntentService = Arc<dyn IntentService>;
pub type SharedCardTokenizer = Arc<dyn CardTokenizer>;
pub type SharedPaymentExecutor = Arc<dyn PaymentExecutor>;
pub type SharedEnrollmentSink = Arc<dyn EnrollmentSink>;
