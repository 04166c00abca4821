//! # checkout-core
//!
//! Core types and traits for the course-checkout-rs payment flow.
//!
//! This crate provides:
//! - `Cart` and `CartItem` for local course selections
//! - `PaymentIntent` for server-priced, single-use checkout intents
//! - `PaymentToken`, `ChargeRequest`, and `PaymentReceipt` for the charge leg
//! - `IdempotencyKey` binding one logical payment attempt
//! - Service traits (`IntentService`, `CardTokenizer`, `PaymentExecutor`,
//!   `EnrollmentSink`) implemented by the sibling crates
//! - The checkout error taxonomy with retry classification
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{Cart, CartItem, Currency, Price};
//!
//! let mut cart = Cart::in_memory();
//! cart.add(CartItem::new("c-001", "Intro a Rust", Price::new(119.0, Currency::PEN)));
//!
//! // Hand the cart to a CheckoutOrchestrator (checkout-flow) together with
//! // an IntentService, CardTokenizer, PaymentExecutor, and EnrollmentSink.
//! ```

pub mod card;
pub mod cart;
pub mod error;
pub mod intent;
pub mod money;
pub mod payment;
pub mod service;

// Re-exports for convenience
pub use card::{CardDetails, ContactDetails};
pub use cart::{Cart, CartItem, CartStorage, MemoryStorage};
pub use error::{
    CheckoutError, CheckoutResult, ExecutionError, IntentError, RetryDisposition, TokenError,
};
pub use intent::{IntentLineItem, IntentStatus, PaymentIntent};
pub use money::{Currency, Price};
pub use payment::{ChargeRequest, IdempotencyKey, PaymentReceipt, PaymentStatus, PaymentToken};
pub use service::{
    CardTokenizer, EnrollmentSink, IntentService, PaymentExecutor, SharedCardTokenizer,
    SharedEnrollmentSink, SharedIntentService, SharedPaymentExecutor,
};
