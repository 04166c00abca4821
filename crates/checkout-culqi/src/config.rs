//! # Culqi Configuration
//!
//! Configuration for the Culqi tokenization provider. Only the public key
//! lives here; the merchant never holds a secret that could charge cards,
//! and raw card data only ever travels to the provider's own origin.

use checkout_core::TokenError;
use std::env;
use std::time::Duration;

/// Culqi provider configuration
#[derive(Debug, Clone)]
pub struct CulqiConfig {
    /// Public key (pk_test_... or pk_live_...)
    pub public_key: String,

    /// Checkout script URL (for testing/mocking)
    pub js_url: String,

    /// Provider API base URL (for testing/mocking)
    pub api_base_url: String,

    /// How many times to probe the provider after the script loads
    pub settle_attempts: u32,

    /// Delay between settle probes
    pub settle_delay: Duration,
}

impl CulqiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CULQI_PUBLIC_KEY`
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_key = env::var("CULQI_PUBLIC_KEY")
            .map_err(|_| TokenError::NotConfigured("CULQI_PUBLIC_KEY not set".to_string()))?;

        if !public_key.starts_with("pk_test_") && !public_key.starts_with("pk_live_") {
            return Err(TokenError::NotConfigured(
                "CULQI_PUBLIC_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        Ok(Self::new(public_key))
    }

    /// Create config with an explicit key (for testing)
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            js_url: "https://checkout.culqi.com/js/v4".to_string(),
            api_base_url: "https://secure.culqi.com".to_string(),
            settle_attempts: 10,
            settle_delay: Duration::from_millis(50),
        }
    }

    /// Whether a plausible public key is present
    pub fn is_configured(&self) -> bool {
        self.public_key.starts_with("pk_test_") || self.public_key.starts_with("pk_live_")
    }

    /// Check if using a test key
    pub fn is_test_mode(&self) -> bool {
        self.public_key.starts_with("pk_test_")
    }

    /// Check if using a live key
    pub fn is_live_mode(&self) -> bool {
        self.public_key.starts_with("pk_live_")
    }

    /// Authorization header value for the token endpoint
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.public_key)
    }

    /// Token exchange endpoint
    pub fn token_url(&self) -> String {
        format!("{}/v2/tokens", self.api_base_url)
    }

    /// Builder: set custom script URL (for testing)
    pub fn with_js_url(mut self, url: impl Into<String>) -> Self {
        self.js_url = url.into();
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the settle policy (for testing)
    pub fn with_settle(mut self, attempts: u32, delay: Duration) -> Self {
        self.settle_attempts = attempts;
        self.settle_delay = delay;
        self
    }
}
