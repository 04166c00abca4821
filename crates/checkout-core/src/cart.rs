//! # Cart Store
//!
//! Local cart state for course selections. The cart never talks to the
//! network: its prices are display hints only, and the server-issued
//! `PaymentIntent` total is the sole authority at charge time.
//!
//! Persistence goes through the injected [`CartStorage`] so each test (or
//! each browsing session) gets its own store instead of sharing a
//! process-wide one.

use crate::money::Price;
use serde::{Deserialize, Serialize};

/// A course selection in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Course identifier (unique within a cart)
    pub course_id: String,

    /// Course title (denormalized for display)
    pub title: String,

    /// Quantity. Courses are not really quantifiable; the field exists for
    /// model uniformity and defaults to 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Display-only price hint from the catalog. Never sent to the server.
    pub price_hint: Price,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Create a cart item for a single course
    pub fn new(course_id: impl Into<String>, title: impl Into<String>, price_hint: Price) -> Self {
        Self {
            course_id: course_id.into(),
            title: title.into(),
            quantity: 1,
            price_hint,
        }
    }
}

/// Storage backend for the cart (the client-local storage analog).
///
/// `persist` receives the full item list on every mutation; `load` is
/// called once when the cart is constructed.
pub trait CartStorage: Send + Sync {
    fn load(&self) -> Vec<CartItem>;
    fn persist(&self, items: &[CartItem]);
}

/// In-memory storage, the default for tests and headless use
#[derive(Default)]
pub struct MemoryStorage {
    items: std::sync::Mutex<Vec<CartItem>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed storage with existing items (simulates a returning session)
    pub fn with_items(items: Vec<CartItem>) -> Self {
        Self {
            items: std::sync::Mutex::new(items),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Vec<CartItem> {
        self.items.lock().expect("cart storage poisoned").clone()
    }

    fn persist(&self, items: &[CartItem]) {
        *self.items.lock().expect("cart storage poisoned") = items.to_vec();
    }
}

/// Ordered cart of course selections.
///
/// Invariant: `course_id` is unique within the cart. Re-adding a course
/// replaces the existing item in place, preserving its position.
pub struct Cart {
    items: Vec<CartItem>,
    storage: Box<dyn CartStorage>,
}

impl Cart {
    /// Create a cart backed by the given storage, loading any persisted items
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        let items = storage.load();
        Self { items, storage }
    }

    /// Create a cart with fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Add a course to the cart. Replaces any existing item with the same
    /// `course_id` in place.
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.course_id == item.course_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.storage.persist(&self.items);
    }

    /// Remove a course from the cart
    pub fn remove(&mut self, course_id: &str) {
        self.items.retain(|i| i.course_id != course_id);
        self.storage.persist(&self.items);
    }

    /// Empty the cart. Called by the orchestrator only after an approved
    /// payment; never speculatively.
    pub fn clear(&mut self) {
        self.items.clear();
        self.storage.persist(&self.items);
    }

    /// Ordered sequence of cart items
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Course ids in cart order
    pub fn course_ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.course_id.clone()).collect()
    }

    /// Sum of price hints, display only. Not an authoritative total.
    ///
    /// Assumes a single-currency cart: the catalog prices every course in
    /// the storefront currency, so all hints share the first item's
    /// currency. A mixed cart would sum raw minor units across currencies,
    /// which is exactly why this figure is never charged; the server-issued
    /// intent total is the only amount that reaches the gateway.
    pub fn total_hint(&self) -> Price {
        let currency = self
            .items
            .first()
            .map(|i| i.price_hint.currency)
            .unwrap_or_default();
        let amount = self
            .items
            .iter()
            .map(|i| i.price_hint.amount * i.quantity as i64)
            .sum();
        Price::from_minor(amount, currency)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn item(id: &str, soles: f64) -> CartItem {
        CartItem::new(id, format!("Course {}", id), Price::new(soles, Currency::PEN))
    }

    #[test]
    fn test_add_and_total_hint() {
        let mut cart = Cart::in_memory();
        cart.add(item("c-001", 119.0));
        cart.add(item("c-002", 49.0));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_hint().amount, 16800);
    }

    #[test]
    fn test_readd_replaces_in_place() {
        let mut cart = Cart::in_memory();
        cart.add(item("c-001", 119.0));
        cart.add(item("c-002", 49.0));
        cart.add(item("c-001", 99.0));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].course_id, "c-001");
        assert_eq!(cart.items()[0].price_hint.amount, 9900);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::in_memory();
        cart.add(item("c-001", 119.0));
        cart.add(item("c-002", 49.0));

        cart.remove("c-001");
        assert_eq!(cart.course_ids(), vec!["c-002"]);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_persists_across_sessions() {
        let storage = std::sync::Arc::new(MemoryStorage::new());

        struct Shared(std::sync::Arc<MemoryStorage>);
        impl CartStorage for Shared {
            fn load(&self) -> Vec<CartItem> {
                self.0.load()
            }
            fn persist(&self, items: &[CartItem]) {
                self.0.persist(items)
            }
        }

        let mut cart = Cart::new(Box::new(Shared(storage.clone())));
        cart.add(item("c-001", 119.0));
        drop(cart);

        let cart = Cart::new(Box::new(Shared(storage)));
        assert_eq!(cart.course_ids(), vec!["c-001"]);
    }
}
