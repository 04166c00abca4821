//! # checkout-flow
//!
//! The checkout state machine. [`CheckoutOrchestrator`] sequences the
//! pipeline (price the cart into an intent, tokenize the card at the
//! provider, execute the charge under an idempotency key, hand approved
//! enrollments off, and only then clear the cart) and [`CheckoutPhase`]
//! gates every step so a submission can never race or double-charge.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_flow::{BeginOutcome, CheckoutOrchestrator, SubmitOutcome};
//!
//! let mut checkout = CheckoutOrchestrator::new(cart, intents, tokenizer, executor, enrollments);
//!
//! match checkout.begin().await? {
//!     BeginOutcome::RedirectToCatalog => return Ok(()),
//!     BeginOutcome::Ready => {}
//! }
//!
//! println!("Total: {}", checkout.displayed_total().unwrap());
//!
//! match checkout.submit(&contact, &card).await? {
//!     SubmitOutcome::Completed { enrollment_ids, .. } => show_success(enrollment_ids),
//!     SubmitOutcome::Declined { .. } => ask_for_another_card(),
//!     SubmitOutcome::Processing { .. } => poll_with(checkout.resolve_pending()),
//! }
//! ```

pub mod orchestrator;
pub mod phase;

// Re-exports
pub use orchestrator::CheckoutOrchestrator;
pub use phase::{BeginOutcome, CheckoutPhase, FailureKind, SubmitOutcome};
