//! # checkout-client
//!
//! HTTP clients for the merchant backend, implementing the `checkout-core`
//! service traits:
//!
//! - [`IntentClient`] creates priced, single-use payment intents from a
//!   list of course ids. The backend is the sole price authority; the
//!   request wire format has no field a price could travel in.
//! - [`ExecutionClient`] submits a token against an intent under an
//!   idempotency key and interprets the approved/rejected/pending result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_client::{ApiConfig, ExecutionClient, IntentClient};
//! use checkout_core::{IntentService, PaymentExecutor};
//!
//! let config = ApiConfig::from_env();
//! let intents = IntentClient::new(config.clone());
//! let executor = ExecutionClient::new(config);
//!
//! let intent = intents.create_intent(&cart.course_ids()).await?;
//! let receipt = executor.execute(&charge, &key).await?;
//! ```

pub mod config;
pub mod execute;
pub mod intent;

// Re-exports
pub use config::ApiConfig;
pub use execute::ExecutionClient;
pub use intent::IntentClient;
