//! # Payment Execution Client
//!
//! Submits a token plus intent id to the backend and interprets the
//! tri-state result. The idempotency key travels as the `Idempotency-Key`
//! request header (a request attribute, not a body field) so the backend
//! can collapse retried requests into a single logical charge even when a
//! response was lost after the charge went through.

use crate::config::ApiConfig;
use async_trait::async_trait;
use checkout_core::{
    ChargeRequest, ExecutionError, IdempotencyKey, PaymentExecutor, PaymentReceipt,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// HTTP client for charge execution
pub struct ExecutionClient {
    config: ApiConfig,
    client: Client,
}

impl ExecutionClient {
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    fn classify_failure(status: reqwest::StatusCode, body: &str) -> ExecutionError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        if status.is_client_error() {
            // The backend rejected the submission outright; no charge
            // happened, so fixing and resending under a new key is safe.
            ExecutionError::Validation(message)
        } else {
            ExecutionError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl PaymentExecutor for ExecutionClient {
    #[instrument(skip(self, request, key), fields(intent_id = %request.intent_id))]
    async fn execute(
        &self,
        request: &ChargeRequest,
        key: &IdempotencyKey,
    ) -> Result<PaymentReceipt, ExecutionError> {
        request.validate()?;

        let body = ExecuteChargeRequest {
            intent_id: request.intent_id.clone(),
            token: request.token.value.clone(),
            token_expiration_month: request.token.exp_month,
            token_expiration_year: request.token.exp_year,
        };

        debug!("Submitting charge for intent");

        let response = self
            .client
            .post(self.config.charges_url())
            .header("Idempotency-Key", key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The request itself failed: the charge outcome is
                // unknown. The caller must reuse this key or query
                // status, never mint a fresh key.
                warn!("Charge request failed in transit: {}", e);
                ExecutionError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Charge submission failed: status={}, body={}", status, body);
            return Err(Self::classify_failure(status, &body));
        }

        let receipt: PaymentReceipt = serde_json::from_str(&body)
            .map_err(|e| ExecutionError::Network(format!("unparseable charge response: {}", e)))?;

        info!(
            "Charge answered: payment_id={}, status={:?}",
            receipt.payment_id, receipt.status
        );

        Ok(receipt)
    }

    #[instrument(skip(self))]
    async fn fetch_status(&self, payment_id: &str) -> Result<PaymentReceipt, ExecutionError> {
        if payment_id.is_empty() {
            return Err(ExecutionError::IncompleteData {
                field: "payment_id".to_string(),
            });
        }

        let response = self
            .client
            .get(self.config.charge_status_url(payment_id))
            .send()
            .await
            .map_err(|e| ExecutionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ExecutionError::Network(format!("unparseable status response: {}", e)))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Charge execution request body. The idempotency key is intentionally
/// absent: it is a request attribute carried in a header.
#[derive(Debug, Serialize)]
struct ExecuteChargeRequest {
    intent_id: String,
    token: String,
    token_expiration_month: u8,
    token_expiration_year: u16,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{PaymentStatus, PaymentToken};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn charge_request() -> ChargeRequest {
        ChargeRequest::new(
            "int_123",
            PaymentToken {
                value: "tok_abc".to_string(),
                exp_month: 9,
                exp_year: 2035,
            },
        )
    }

    fn client_for(server: &MockServer) -> ExecutionClient {
        ExecutionClient::new(ApiConfig::new(server.uri()))
    }

    #[tokio::test]
    async fn test_execute_approved_with_key_in_header_only() {
        let server = MockServer::start().await;
        let key = IdempotencyKey::new();

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/charges"))
            .and(header("Idempotency-Key", key.as_str()))
            .and(body_json(serde_json::json!({
                "intent_id": "int_123",
                "token": "tok_abc",
                "token_expiration_month": 9,
                "token_expiration_year": 2035
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": "pay_1",
                "status": "approved",
                "enrollment_ids": ["e-1"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let receipt = client.execute(&charge_request(), &key).await.unwrap();

        assert_eq!(receipt.status, PaymentStatus::Approved);
        assert_eq!(receipt.enrollment_ids, vec!["e-1"]);
        // body_json above is exact: the key is not in the body.
    }

    #[tokio::test]
    async fn test_execute_rejected_and_pending() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/charges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": "pay_2",
                "status": "rejected"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let receipt = client
            .execute(&charge_request(), &IdempotencyKey::new())
            .await
            .unwrap();
        assert_eq!(receipt.status, PaymentStatus::Rejected);
        assert!(receipt.enrollment_ids.is_empty());

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/charges"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "payment_id": "pay_3",
                "status": "pending"
            })))
            .mount(&server)
            .await;

        let receipt = client
            .execute(&charge_request(), &IdempotencyKey::new())
            .await
            .unwrap();
        assert_eq!(receipt.status, PaymentStatus::Pending);
        assert!(!receipt.status.is_terminal());
    }

    #[tokio::test]
    async fn test_incomplete_data_never_hits_the_wire() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/charges"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut request = charge_request();
        request.token.value.clear();

        let err = client
            .execute(&request, &IdempotencyKey::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::IncompleteData { ref field } if field == "token"));
    }

    #[tokio::test]
    async fn test_transport_failure_has_unknown_outcome() {
        let client = ExecutionClient::new(
            ApiConfig::new("http://127.0.0.1:1").with_timeout(std::time::Duration::from_secs(2)),
        );

        let err = client
            .execute(&charge_request(), &IdempotencyKey::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Network(_)));
        assert!(!err.outcome_known());
    }

    #[tokio::test]
    async fn test_validation_failure_is_safe_to_resend() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/charges"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Token already used",
                "code": 400
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .execute(&charge_request(), &IdempotencyKey::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Validation(ref m) if m == "Token already used"));
        assert!(err.outcome_known());
    }

    #[tokio::test]
    async fn test_fetch_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/payments/charges/pay_3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": "pay_3",
                "status": "approved",
                "enrollment_ids": ["e-9"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let receipt = client.fetch_status("pay_3").await.unwrap();

        assert_eq!(receipt.status, PaymentStatus::Approved);
        assert_eq!(receipt.enrollment_ids, vec!["e-9"]);
    }
}
