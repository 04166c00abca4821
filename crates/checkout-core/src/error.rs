//! # Checkout Error Taxonomy
//!
//! One error family per pipeline stage, each with the classification the
//! orchestrator needs to pick a retry affordance. Nothing here fails
//! silently: every variant carries a user-presentable message.

use thiserror::Error;

/// Errors from intent creation
#[derive(Debug, Clone, Error)]
pub enum IntentError {
    /// No courses in the cart; caught before any network call
    #[error("Cart is empty")]
    EmptyCart,

    /// Transport-level failure; the request may be retried as-is
    #[error("Network error: {0}")]
    Network(String),

    /// A course is no longer purchasable or priced; retrying without
    /// changing the cart cannot succeed
    #[error("Invalid cart: {0}")]
    Validation(String),

    /// Backend failure; retryable with backoff
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl IntentError {
    /// Returns true if retrying the identical request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntentError::Network(_) | IntentError::Server { .. })
    }
}

/// Errors from the tokenization adapter
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// Provider public key is absent; checkout must not start
    #[error("Tokenization is not configured: {0}")]
    NotConfigured(String),

    /// Provider script failed to load or never became callable; fatal for
    /// the checkout session, no degraded fallback
    #[error("Payment provider failed to load: {0}")]
    ScriptLoad(String),

    /// The tokenize call was rejected; recoverable by re-entering card data
    #[error("Card could not be tokenized: {0}")]
    Rejected(String),

    /// Card field failed well-formedness validation; never sent anywhere
    #[error("Invalid card {field}: {message}")]
    InvalidCard { field: String, message: String },
}

impl TokenError {
    /// Fatal errors end the checkout session; the rest return the user to
    /// card entry with the provider still loaded
    pub fn is_fatal(&self) -> bool {
        matches!(self, TokenError::NotConfigured(_) | TokenError::ScriptLoad(_))
    }
}

/// Errors from payment execution, distinct from the tri-state result
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// A required field is missing locally; never sent over the network
    #[error("Incomplete payment data: missing {field}")]
    IncompleteData { field: String },

    /// The request itself failed and the charge outcome is UNKNOWN.
    /// Must not be retried with a fresh idempotency key.
    #[error("Network error, charge outcome unknown: {0}")]
    Network(String),

    /// Malformed submission; safe to fix and resend under a new key
    #[error("Invalid payment submission: {0}")]
    Validation(String),

    /// Backend failure with a definite non-charge
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ExecutionError {
    /// Whether the charge outcome is known. `Network` is the one case
    /// where the charge may have succeeded server-side.
    pub fn outcome_known(&self) -> bool {
        !matches!(self, ExecutionError::Network(_))
    }
}

/// What state the retry affordance may reuse after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    /// Resend the identical submission: same intent, same token, same key
    RetrySameAttempt,
    /// Return to card entry: new token and new key, same intent if usable
    NewCard,
    /// The cart itself must change before another attempt
    AmendCart,
    /// Nothing to retry in this session
    Fatal,
}

/// Orchestrator-level error: one user-facing message plus the disposition
/// deciding which checkout state survives the failure
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Enrollment hand-off failed after an approved payment. The cart is
    /// intentionally left intact for recovery.
    #[error("Enrollment hand-off failed: {0}")]
    Enrollment(String),

    /// Operation not valid in the current checkout phase
    #[error("Checkout is not in a state that allows this: {0}")]
    InvalidPhase(String),
}

impl CheckoutError {
    /// Resolve this error into a retry disposition
    pub fn disposition(&self) -> RetryDisposition {
        match self {
            CheckoutError::Input(_) => RetryDisposition::NewCard,
            CheckoutError::Intent(IntentError::Validation(_)) => RetryDisposition::AmendCart,
            CheckoutError::Intent(_) => RetryDisposition::Fatal,
            CheckoutError::Token(e) if e.is_fatal() => RetryDisposition::Fatal,
            CheckoutError::Token(_) => RetryDisposition::NewCard,
            CheckoutError::Execution(ExecutionError::Network(_)) => {
                RetryDisposition::RetrySameAttempt
            }
            CheckoutError::Execution(_) => RetryDisposition::NewCard,
            CheckoutError::Enrollment(_) => RetryDisposition::Fatal,
            CheckoutError::InvalidPhase(_) => RetryDisposition::Fatal,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_retryability() {
        assert!(IntentError::Network("timeout".into()).is_retryable());
        assert!(IntentError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!IntentError::Validation("course gone".into()).is_retryable());
        assert!(!IntentError::EmptyCart.is_retryable());
    }

    #[test]
    fn test_token_fatality() {
        assert!(TokenError::ScriptLoad("cdn down".into()).is_fatal());
        assert!(TokenError::NotConfigured("no key".into()).is_fatal());
        assert!(!TokenError::Rejected("bad card".into()).is_fatal());
    }

    #[test]
    fn test_execution_outcome_known() {
        assert!(!ExecutionError::Network("reset".into()).outcome_known());
        assert!(ExecutionError::Validation("bad token".into()).outcome_known());
    }

    #[test]
    fn test_dispositions() {
        let unknown: CheckoutError = ExecutionError::Network("reset".into()).into();
        assert_eq!(unknown.disposition(), RetryDisposition::RetrySameAttempt);

        let amend: CheckoutError = IntentError::Validation("gone".into()).into();
        assert_eq!(amend.disposition(), RetryDisposition::AmendCart);

        let fatal: CheckoutError = TokenError::ScriptLoad("cdn".into()).into();
        assert_eq!(fatal.disposition(), RetryDisposition::Fatal);

        let recover: CheckoutError = TokenError::Rejected("declined".into()).into();
        assert_eq!(recover.disposition(), RetryDisposition::NewCard);
    }
}
