//! # Payment Intent Client
//!
//! Asks the backend to price a cart and issue a single-use intent. The
//! request carries course ids only; there is no field for a price, so a
//! client cannot dictate one even by accident.

use crate::config::ApiConfig;
use async_trait::async_trait;
use checkout_core::{
    Currency, IntentError, IntentLineItem, IntentService, IntentStatus, PaymentIntent, Price,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// HTTP client for intent creation
pub struct IntentClient {
    config: ApiConfig,
    client: Client,
}

impl IntentClient {
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
}

#[async_trait]
impl IntentService for IntentClient {
    #[instrument(skip(self), fields(courses = course_ids.len()))]
    async fn create_intent(&self, course_ids: &[String]) -> Result<PaymentIntent, IntentError> {
        if course_ids.is_empty() {
            return Err(IntentError::EmptyCart);
        }

        let request = CreateIntentRequest {
            course_ids: course_ids.to_vec(),
        };

        debug!("Creating payment intent for {} course(s)", course_ids.len());

        let response = self
            .client
            .post(self.config.intents_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| IntentError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IntentError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Intent creation failed: status={}, body={}", status, body);

            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("HTTP {}", status));

            // 4xx means the cart itself is bad (course gone, unpriced);
            // retrying without changing the cart cannot succeed.
            return if status.is_client_error() {
                Err(IntentError::Validation(message))
            } else {
                Err(IntentError::Server {
                    status: status.as_u16(),
                    message,
                })
            };
        }

        let wire: IntentResponse = serde_json::from_str(&body)
            .map_err(|e| IntentError::Network(format!("unparseable intent response: {}", e)))?;

        info!("Created payment intent: id={}", wire.id);

        Ok(wire.into_intent())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Intent creation request. Course ids only; the backend computes every
/// price. There is deliberately no field a price could travel in.
#[derive(Debug, Serialize)]
struct CreateIntentRequest {
    course_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    /// Total in smallest currency unit, server-computed
    total: i64,
    currency: Currency,
    line_items: Vec<IntentLineItemWire>,
    #[serde(default)]
    status: IntentStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct IntentLineItemWire {
    course_id: String,
    course_title: String,
    unit_price: i64,
}

impl IntentResponse {
    fn into_intent(self) -> PaymentIntent {
        let currency = self.currency;
        PaymentIntent {
            id: self.id,
            total: Price::from_minor(self.total, currency),
            line_items: self
                .line_items
                .into_iter()
                .map(|li| IntentLineItem {
                    course_id: li.course_id,
                    course_title: li.course_title,
                    unit_price: Price::from_minor(li.unit_price, currency),
                })
                .collect(),
            status: self.status,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> IntentClient {
        IntentClient::new(ApiConfig::new(server.uri()))
    }

    fn intent_body() -> serde_json::Value {
        serde_json::json!({
            "id": "int_123",
            "total": 11900,
            "currency": "pen",
            "line_items": [
                {"course_id": "c-001", "course_title": "Intro a Rust", "unit_price": 11900}
            ],
            "status": "pending",
            "created_at": "2026-08-01T12:00:00Z",
            "expires_at": "2026-08-01T12:30:00Z"
        })
    }

    #[tokio::test]
    async fn test_create_intent_sends_ids_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .and(body_json(serde_json::json!({
                "course_ids": ["c-001", "c-002"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(intent_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let intent = client
            .create_intent(&["c-001".to_string(), "c-002".to_string()])
            .await
            .unwrap();

        assert_eq!(intent.id, "int_123");
        // Authoritative total arrives verbatim: S/ 119.00, no client math.
        assert_eq!(intent.total.amount, 11900);
        assert_eq!(intent.total.display(), "S/ 119.00");
        assert_eq!(intent.line_items.len(), 1);

        // body_json is an exact match, so this also proves no price field
        // rode along in the request.
        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent.get("total").is_none());
        assert!(sent.get("price").is_none());
    }

    #[tokio::test]
    async fn test_discounted_total_renders_verbatim() {
        // A server-side discount makes the total diverge from the sum of
        // line-item prices. The client must not reconcile the difference.
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "int_456",
                "total": 9900,
                "currency": "pen",
                "line_items": [
                    {"course_id": "c-001", "course_title": "Intro a Rust", "unit_price": 11900}
                ],
                "status": "pending",
                "created_at": "2026-08-01T12:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let intent = client.create_intent(&["c-001".to_string()]).await.unwrap();

        assert_eq!(intent.total.amount, 9900);
        assert_eq!(intent.total.display(), "S/ 99.00");
        // The line item keeps its undiscounted unit price untouched.
        assert_eq!(intent.line_items[0].unit_price.amount, 11900);
    }

    #[tokio::test]
    async fn test_empty_cart_never_calls_the_network() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .respond_with(ResponseTemplate::new(201).set_body_json(intent_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.create_intent(&[]).await.unwrap_err();

        assert!(matches!(err, IntentError::EmptyCart));
    }

    #[tokio::test]
    async fn test_client_error_is_validation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "error": "Course c-001 is no longer available",
                "code": 422
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create_intent(&["c-001".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, IntentError::Validation(ref m) if m.contains("c-001")));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create_intent(&["c-001".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, IntentError::Server { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_transport_failure_is_network() {
        let client = IntentClient::new(
            ApiConfig::new("http://127.0.0.1:1").with_timeout(std::time::Duration::from_secs(2)),
        );
        let err = client
            .create_intent(&["c-001".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, IntentError::Network(_)));
        assert!(err.is_retryable());
    }
}
