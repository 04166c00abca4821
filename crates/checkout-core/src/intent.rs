//! # Payment Intent Types
//!
//! A `PaymentIntent` is the server-issued, price-authoritative record of
//! what is about to be purchased. The client never derives or overrides
//! `total` or `line_items`; it only displays them.

use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Intent created, awaiting a charge
    Pending,
    /// A charge against this intent was approved
    Completed,
    /// A charge against this intent failed terminally
    Failed,
    /// Intent was cancelled server-side
    Cancelled,
}

impl Default for IntentStatus {
    fn default() -> Self {
        IntentStatus::Pending
    }
}

/// A priced line item on an intent (server-computed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentLineItem {
    /// Course ID
    pub course_id: String,

    /// Course title as priced by the server
    pub course_title: String,

    /// Unit price, authoritative
    pub unit_price: Price,
}

/// A server-issued payment intent.
///
/// One intent maps to exactly one checkout attempt. Intents are single-use,
/// expire passively server-side, and are never reused across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Server-issued opaque ID
    pub id: String,

    /// Authoritative total. Display verbatim; never recompute.
    pub total: Price,

    /// Authoritative line items
    pub line_items: Vec<IntentLineItem>,

    /// Intent status
    #[serde(default)]
    pub status: IntentStatus,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// When the intent expires (server-enforced; absent means opaque)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    /// Whether this intent can still carry a charge attempt.
    ///
    /// Expiry is ultimately server-enforced; this is the client-side
    /// fast path for deciding to request a fresh intent before retrying.
    pub fn is_usable(&self) -> bool {
        matches!(self.status, IntentStatus::Pending)
            && self.expires_at.map(|exp| exp > Utc::now()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use chrono::Duration;

    fn intent(status: IntentStatus, expires_at: Option<DateTime<Utc>>) -> PaymentIntent {
        PaymentIntent {
            id: "int_test".to_string(),
            total: Price::new(119.00, Currency::PEN),
            line_items: vec![IntentLineItem {
                course_id: "c-001".to_string(),
                course_title: "Intro a Rust".to_string(),
                unit_price: Price::new(119.00, Currency::PEN),
            }],
            status,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_usable_while_pending() {
        assert!(intent(IntentStatus::Pending, None).is_usable());
        assert!(intent(IntentStatus::Pending, Some(Utc::now() + Duration::minutes(10))).is_usable());
    }

    #[test]
    fn test_unusable_when_expired_or_terminal() {
        assert!(!intent(IntentStatus::Pending, Some(Utc::now() - Duration::minutes(1))).is_usable());
        assert!(!intent(IntentStatus::Completed, None).is_usable());
        assert!(!intent(IntentStatus::Cancelled, None).is_usable());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&IntentStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
