//! # Backend API Configuration
//!
//! Where the merchant backend lives. Deliberately tiny: the client holds
//! no price configuration and no secrets.

use std::env;
use std::time::Duration;

/// Merchant backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL (e.g., "https://api.aulaya.pe")
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load from environment variables (`CHECKOUT_API_BASE_URL`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            base_url: env::var("CHECKOUT_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config with an explicit base URL (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Intent creation endpoint
    pub fn intents_url(&self) -> String {
        format!("{}/api/v1/payments/intents", self.base_url)
    }

    /// Charge execution endpoint
    pub fn charges_url(&self) -> String {
        format!("{}/api/v1/payments/charges", self.base_url)
    }

    /// Charge status endpoint
    pub fn charge_status_url(&self, payment_id: &str) -> String {
        format!("{}/api/v1/payments/charges/{}", self.base_url, payment_id)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
