//! # checkout-culqi
//!
//! Culqi card tokenization adapter for course-checkout-rs.
//!
//! Raw card data is exchanged for a single-use token against the
//! provider's own origin, so the merchant backend never sees a PAN or CVV
//! (PCI scope reduction by design). The externally hosted checkout script
//! is loaded at most once process-wide through [`ScriptLoader`], and
//! `Ready` is reported only after the provider answers a probe.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_culqi::CulqiTokenizer;
//! use checkout_core::{CardDetails, CardTokenizer};
//!
//! // Create tokenizer from environment (CULQI_PUBLIC_KEY)
//! let tokenizer = CulqiTokenizer::from_env()?;
//!
//! // Load the provider script once; gate the pay button on this.
//! tokenizer.ensure_ready().await?;
//!
//! // Exchange card fields for a token, then discard the fields.
//! let token = tokenizer.tokenize(&card).await?;
//! ```
//!
//! ## Failure policy
//!
//! Script-load failure is fatal for the checkout attempt: there is no
//! degraded, non-PCI-safe fallback. A rejected tokenize call is
//! recoverable; the loader stays `Ready` and the form can be resubmitted.

pub mod config;
pub mod loader;
pub mod tokenizer;

// Re-exports
pub use config::CulqiConfig;
pub use loader::{LoaderState, ScriptLoader};
pub use tokenizer::CulqiTokenizer;
