//! # Checkout Phases
//!
//! The single source of truth for where a checkout currently stands.
//! Every side effect in the pipeline is gated on these phases rather than
//! on racing requests and reconciling afterward.

/// How a failed checkout can proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The cart must change (a course became unpurchasable); a fresh
    /// `begin` is allowed once it has
    Recoverable,
    /// The charge request failed in transit and its outcome is unknown.
    /// The same submission may be resent under the same idempotency key;
    /// the user must NOT be told the payment definitely failed.
    UnknownOutcome,
    /// Nothing in this session can be retried (missing provider key,
    /// provider script unavailable, intent creation failed)
    Fatal,
}

/// Checkout state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No checkout in progress
    Idle,
    /// Waiting for the backend to price the cart
    CreatingIntent,
    /// Intent exists and the provider is ready; card entry is open
    AwaitingCard,
    /// Exchanging card fields for a token at the provider
    Tokenizing,
    /// Charge submitted, awaiting the tri-state answer
    Submitting,
    /// The gateway answered `pending`; submission is blocked until the
    /// charge resolves
    PendingConfirmation,
    /// Payment approved, enrollments handed off, cart cleared
    Succeeded,
    /// See [`FailureKind`]
    Failed(FailureKind),
}

impl CheckoutPhase {
    /// Whether the pay action is currently allowed
    pub fn can_submit(&self) -> bool {
        matches!(self, CheckoutPhase::AwaitingCard)
    }

    /// Whether a new checkout may begin from here
    pub fn can_begin(&self) -> bool {
        matches!(self, CheckoutPhase::Idle | CheckoutPhase::Failed(_))
    }

    /// Terminal phases need a `cancel` (or a fresh orchestrator) to leave
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::Succeeded | CheckoutPhase::Failed(FailureKind::Fatal)
        )
    }
}

/// Result of entering a checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    /// Intent created, provider ready, card entry open
    Ready,
    /// The cart was empty; leave checkout instead of entering the machine
    RedirectToCatalog,
}

/// Result of a submission (or of resolving a pending/unknown one)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Terminal success; the caller should navigate to the success view
    Completed {
        payment_id: String,
        enrollment_ids: Vec<String>,
    },
    /// Terminal for this token; the user is back at card entry
    Declined { payment_id: String },
    /// Charge is processing asynchronously; poll `resolve_pending`
    Processing { payment_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_gate() {
        assert!(CheckoutPhase::AwaitingCard.can_submit());
        assert!(!CheckoutPhase::CreatingIntent.can_submit());
        assert!(!CheckoutPhase::PendingConfirmation.can_submit());
        assert!(!CheckoutPhase::Failed(FailureKind::UnknownOutcome).can_submit());
    }

    #[test]
    fn test_begin_gate() {
        assert!(CheckoutPhase::Idle.can_begin());
        assert!(CheckoutPhase::Failed(FailureKind::Fatal).can_begin());
        assert!(!CheckoutPhase::Submitting.can_begin());
        assert!(!CheckoutPhase::Succeeded.can_begin());
    }
}
