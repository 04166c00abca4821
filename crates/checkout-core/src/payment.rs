//! # Payment Types
//!
//! Tokens, charge requests, receipts, and idempotency keys.

use crate::error::ExecutionError;
use serde::Deserialize;
use uuid::Uuid;

/// A single-use card token minted by the tokenization provider.
///
/// The value is opaque and must be discarded after its first terminal use.
/// Never persisted, never logged; `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentToken {
    /// Opaque token value (e.g., "tkn_live_...")
    pub value: String,
    /// Card expiration month, echoed by the provider
    pub exp_month: u8,
    /// Card expiration year, echoed by the provider
    pub exp_year: u16,
}

impl std::fmt::Debug for PaymentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentToken")
            .field("value", &"[redacted]")
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish()
    }
}

/// Client-generated key binding one logical "pay this intent with this
/// token" attempt.
///
/// The same key must be reused for automatic retries of the same
/// submission; a new key is minted only when a new token is, because that
/// is a logically distinct attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Generate a fresh key
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the execution client submits for one charge attempt.
///
/// The idempotency key travels separately (as a request header), so a
/// retried `ChargeRequest` under the same key is one logical charge.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub intent_id: String,
    pub token: PaymentToken,
}

impl ChargeRequest {
    pub fn new(intent_id: impl Into<String>, token: PaymentToken) -> Self {
        Self {
            intent_id: intent_id.into(),
            token,
        }
    }

    /// Local completeness check. An incomplete request is never sent over
    /// the network.
    pub fn validate(&self) -> Result<(), ExecutionError> {
        let missing = |field: &str| ExecutionError::IncompleteData {
            field: field.to_string(),
        };
        if self.intent_id.is_empty() {
            return Err(missing("intent_id"));
        }
        if self.token.value.is_empty() {
            return Err(missing("token"));
        }
        if !(1..=12).contains(&self.token.exp_month) {
            return Err(missing("token_expiration_month"));
        }
        if self.token.exp_year == 0 {
            return Err(missing("token_expiration_year"));
        }
        Ok(())
    }
}

/// Tri-state outcome of a charge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Terminal success; enrollment was created server-side
    Approved,
    /// Terminal failure for this token; a fresh token is required
    Rejected,
    /// Charge is still processing asynchronously
    Pending,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// Result of a charge attempt, consumed once by the orchestrator
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway payment ID
    pub payment_id: String,

    /// Tri-state status
    pub status: PaymentStatus,

    /// Enrollments created by an approved payment, handed off verbatim
    #[serde(default)]
    pub enrollment_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> PaymentToken {
        PaymentToken {
            value: "tkn_test_abc".to_string(),
            exp_month: 9,
            exp_year: 2030,
        }
    }

    #[test]
    fn test_token_debug_redacts() {
        let rendered = format!("{:?}", token());
        assert!(!rendered.contains("tkn_test_abc"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn test_idempotency_keys_are_unique() {
        assert_ne!(IdempotencyKey::new(), IdempotencyKey::new());
    }

    #[test]
    fn test_charge_request_completeness() {
        let req = ChargeRequest::new("int_1", token());
        assert!(req.validate().is_ok());

        let empty_intent = ChargeRequest::new("", token());
        assert!(matches!(
            empty_intent.validate(),
            Err(ExecutionError::IncompleteData { ref field }) if field == "intent_id"
        ));

        let mut bad_month = ChargeRequest::new("int_1", token());
        bad_month.token.exp_month = 13;
        assert!(bad_month.validate().is_err());
    }

    #[test]
    fn test_receipt_parse_defaults_enrollments() {
        let receipt: PaymentReceipt =
            serde_json::from_str(r#"{"payment_id":"pay_1","status":"pending"}"#).unwrap();
        assert_eq!(receipt.status, PaymentStatus::Pending);
        assert!(receipt.enrollment_ids.is_empty());
        assert!(!receipt.status.is_terminal());
    }
}
