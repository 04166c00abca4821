//! # Culqi Tokenizer
//!
//! Exchanges validated card fields for a single-use token against the
//! provider's own origin. This call never touches the merchant backend,
//! which is the whole point: raw card numbers stay out of PCI scope.

use crate::config::CulqiConfig;
use crate::loader::ScriptLoader;
use async_trait::async_trait;
use checkout_core::{CardDetails, CardTokenizer, PaymentToken, TokenError};
use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Tokenization adapter for Culqi
pub struct CulqiTokenizer {
    config: CulqiConfig,
    client: Client,
    loader: Arc<ScriptLoader>,
}

impl CulqiTokenizer {
    /// Create a tokenizer with its own loader (tests). Production code
    /// normally uses [`CulqiTokenizer::shared`] so all components observe
    /// one script load.
    pub fn new(config: CulqiConfig) -> Self {
        let loader = Arc::new(ScriptLoader::new(&config));
        Self::with_loader(config, loader)
    }

    /// Create a tokenizer sharing the process-wide loader
    pub fn shared(config: CulqiConfig) -> Self {
        let loader = crate::loader::global(&config);
        Self::with_loader(config, loader)
    }

    /// Create a tokenizer with an explicit loader
    pub fn with_loader(config: CulqiConfig, loader: Arc<ScriptLoader>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            loader,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, TokenError> {
        let config = CulqiConfig::from_env()?;
        Ok(Self::shared(config))
    }

    /// The loader backing this tokenizer, for UI readiness gating
    pub fn loader(&self) -> &Arc<ScriptLoader> {
        &self.loader
    }
}

#[async_trait]
impl CardTokenizer for CulqiTokenizer {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    #[instrument(skip(self))]
    async fn ensure_ready(&self) -> Result<(), TokenError> {
        if !self.is_configured() {
            return Err(TokenError::NotConfigured(
                "Culqi public key is missing".to_string(),
            ));
        }
        self.loader.ensure_ready().await
    }

    #[instrument(skip(self, card))]
    async fn tokenize(&self, card: &CardDetails) -> Result<PaymentToken, TokenError> {
        let now = Utc::now();
        card.validate(now.month() as u8, now.year() as u16)?;

        // Tokenizing is only legal once the provider is callable. This is
        // a no-op when the loader is already Ready.
        self.ensure_ready().await?;

        let request = CulqiTokenRequest {
            card_number: card.normalized_number(),
            cvv: card.cvv.clone(),
            expiration_month: format!("{:02}", card.exp_month),
            expiration_year: card.exp_year.to_string(),
        };

        debug!("Requesting card token from provider");

        let response = self
            .client
            .post(self.config.token_url())
            .header("Authorization", self.config.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(|e| TokenError::Rejected(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Rejected(format!("token response failed: {}", e)))?;

        if !status.is_success() {
            // A rejected tokenize call is recoverable: the loader stays
            // Ready and the user can resubmit the form.
            let message = serde_json::from_str::<CulqiErrorResponse>(&body)
                .map(|e| e.user_message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            error!("Tokenize call rejected: {}", message);
            return Err(TokenError::Rejected(message));
        }

        let token_response: CulqiTokenResponse = serde_json::from_str(&body)
            .map_err(|e| TokenError::Rejected(format!("unparseable token response: {}", e)))?;

        info!("Card token minted");

        Ok(PaymentToken {
            value: token_response.id,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
        })
    }
}

// =============================================================================
// Provider API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CulqiTokenRequest {
    card_number: String,
    cvv: String,
    expiration_month: String,
    expiration_year: String,
}

#[derive(Debug, Deserialize)]
struct CulqiTokenResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CulqiErrorResponse {
    user_message: String,
}
