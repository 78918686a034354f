//! The cart engine: the register's state machine of record.
//!
//! A [`CartEngine`] owns the cart for one session. Every mutation goes
//! through its methods, which keep these invariants:
//!
//! - at most one [`LineItem`] per product, in first-added order
//! - every line has `quantity >= 1`; setting a quantity to zero removes it
//! - unit prices are snapshotted when a product is first added
//!
//! Totals are derived on every call to [`CartEngine::compute_totals`].
//!
//! # Example
//!
//! ```rust
//! # use till_core::{CartEngine, CompanyId, Location, LocationId, Money, Product, ProductId};
//! # let location = Location {
//! #     id: LocationId::new("l"), name: "Main".into(), address: "1 Main St".into(),
//! #     city: "Springfield".into(), company_id: CompanyId::new("c"),
//! # };
//! # let tee = Product {
//! #     id: ProductId::new("tee"), name: "Tee".into(), unit_price: Money::from_cents(1000),
//! #     sku: None, category_tags: vec![],
//! # };
//! let mut cart = CartEngine::new(location);
//! cart.add_item(&tee);
//! cart.add_item(&tee);
//!
//! let totals = cart.compute_totals();
//! assert_eq!(totals.subtotal, Money::from_cents(2000));
//! assert_eq!(totals.tax, Money::from_cents(175));
//! assert_eq!(totals.total, Money::from_cents(2175));
//! ```

mod line_item;
mod tax;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

pub use line_item::LineItem;
pub use tax::{FlatRateTax, MoneyTotals, TaxPolicy};

use crate::types::{Location, Money, Product, ProductId};

/// Errors returned by cart operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),
}

/// Cart state for one session.
#[derive(Debug, Clone)]
pub struct CartEngine {
    location: Location,
    lines: Vec<LineItem>,
    tax_policy: Arc<dyn TaxPolicy>,
}

impl CartEngine {
    /// Empty cart at `location`, taxed at [`FlatRateTax::DEFAULT_RATE`].
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self::with_tax_policy(location, Arc::new(FlatRateTax::default()))
    }

    /// Empty cart at `location` using a custom tax policy.
    #[must_use]
    pub fn with_tax_policy(location: Location, tax_policy: Arc<dyn TaxPolicy>) -> Self {
        Self {
            location,
            lines: Vec::new(),
            tax_policy,
        }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line if there is one (keeping its original
    /// price snapshot), otherwise appends a new line at quantity 1.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            line.bump();
            debug!(product_id = %product.id, quantity = line.quantity(), "Incremented cart line");
        } else {
            self.lines.push(LineItem::from_product(product));
            debug!(product_id = %product.id, "Added cart line");
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// `quantity <= 0` removes the line and is never an error, exactly like
    /// [`remove_item`](Self::remove_item). Quantities above
    /// [`LineItem::MAX_QUANTITY`] are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if `quantity > 0` and the product has
    /// no line in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CartError::NotFound(product_id.clone()))?;
        line.set_quantity(quantity);
        debug!(product_id = %product_id, quantity, "Set cart line quantity");
        Ok(())
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product is not in the cart.
    pub fn increment(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let quantity = self.quantity_of(product_id)?;
        self.set_quantity(product_id, i64::from(quantity) + 1)
    }

    /// Remove one unit from an existing line, dropping the line at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product is not in the cart.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let quantity = self.quantity_of(product_id)?;
        self.set_quantity(product_id, i64::from(quantity) - 1)
    }

    /// Remove a line. Does nothing if the product is not in the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        if self.lines.len() < before {
            debug!(product_id = %product_id, "Removed cart line");
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        debug!("Cleared cart");
    }

    /// Subtotal, tax and total of the current lines.
    ///
    /// Pure function of the cart: repeated calls without mutation return
    /// identical totals.
    #[must_use]
    pub fn compute_totals(&self) -> MoneyTotals {
        let subtotal: Money = self.lines.iter().map(LineItem::line_total).sum();
        let tax = self.tax_policy.tax(subtotal, &self.location);
        MoneyTotals::from_subtotal(subtotal, tax)
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// The location this cart is taxed at.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    fn quantity_of(&self, product_id: &ProductId) -> Result<u32, CartError> {
        self.line(product_id)
            .map(LineItem::quantity)
            .ok_or_else(|| CartError::NotFound(product_id.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{CompanyId, LocationId};

    fn store() -> Location {
        Location {
            id: LocationId::new("loc-1"),
            name: "Main".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            company_id: CompanyId::new("acme"),
        }
    }

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Money::from_cents(cents),
            sku: None,
            category_tags: Vec::new(),
        }
    }

    fn ids(cart: &CartEngine) -> Vec<&str> {
        cart.lines().iter().map(|l| l.product_id().as_str()).collect()
    }

    // =========================================================================
    // add_item
    // =========================================================================

    #[test]
    fn test_add_same_product_twice_yields_one_line() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 1000);
        cart.add_item(&a);
        cart.add_item(&a);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(&a.id).unwrap().quantity(), 2);
    }

    #[test]
    fn test_add_counts_per_product_and_keeps_insertion_order() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 100);
        let b = product("b", 200);
        for p in [&b, &a, &b, &a, &b] {
            cart.add_item(p);
        }

        assert_eq!(ids(&cart), vec!["b", "a"]);
        assert_eq!(cart.line(&a.id).unwrap().quantity(), 2);
        assert_eq!(cart.line(&b.id).unwrap().quantity(), 3);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut cart = CartEngine::new(store());
        let mut a = product("a", 1000);
        cart.add_item(&a);

        a.unit_price = Money::from_cents(9999);
        cart.add_item(&a);

        let line = cart.line(&a.id).unwrap();
        assert_eq!(line.unit_price(), Money::from_cents(1000));
        assert_eq!(cart.compute_totals().subtotal, Money::from_cents(2000));
    }

    // =========================================================================
    // set_quantity / remove_item
    // =========================================================================

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 100);
        for _ in 0..4 {
            cart.add_item(&a);
        }
        cart.set_quantity(&a.id, 0).unwrap();
        assert!(cart.line(&a.id).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_negative_removes_line() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 100);
        cart.add_item(&a);
        cart.set_quantity(&a.id, -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_on_absent_is_noop() {
        let mut cart = CartEngine::new(store());
        cart.add_item(&product("a", 100));
        assert!(cart.set_quantity(&ProductId::new("zzz"), 0).is_ok());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_positive_on_absent_is_not_found() {
        let mut cart = CartEngine::new(store());
        let missing = ProductId::new("zzz");
        assert_eq!(
            cart.set_quantity(&missing, 2),
            Err(CartError::NotFound(missing))
        );
    }

    #[test]
    fn test_set_quantity_overwrites_and_keeps_position() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 100);
        let b = product("b", 100);
        cart.add_item(&a);
        cart.add_item(&b);
        cart.set_quantity(&a.id, 7).unwrap();

        assert_eq!(ids(&cart), vec!["a", "b"]);
        assert_eq!(cart.line(&a.id).unwrap().quantity(), 7);
    }

    #[test]
    fn test_set_quantity_clamps_huge_values() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 1);
        cart.add_item(&a);
        cart.set_quantity(&a.id, i64::MAX).unwrap();
        assert_eq!(cart.line(&a.id).unwrap().quantity(), LineItem::MAX_QUANTITY);
    }

    #[test]
    fn test_totals_at_price_and_quantity_limits() {
        let mut cart = CartEngine::new(store());
        let dear = Product {
            unit_price: Money::MAX_PRICE,
            ..product("dear", 0)
        };
        cart.add_item(&dear);
        cart.set_quantity(&dear.id, i64::from(u32::MAX)).unwrap();

        let totals = cart.compute_totals();
        let subtotal = Money::MAX_PRICE.times(LineItem::MAX_QUANTITY);
        assert_eq!(totals.subtotal, subtotal);
        assert_eq!(totals.total, subtotal + totals.tax);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = CartEngine::new(store());
        cart.add_item(&product("a", 100));
        cart.remove_item(&ProductId::new("b"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 100);
        cart.add_item(&a);

        cart.increment(&a.id).unwrap();
        assert_eq!(cart.line(&a.id).unwrap().quantity(), 2);

        cart.decrement(&a.id).unwrap();
        cart.decrement(&a.id).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(cart.decrement(&a.id), Err(CartError::NotFound(_))));
        assert!(matches!(cart.increment(&a.id), Err(CartError::NotFound(_))));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartEngine::new(store());
        cart.add_item(&product("a", 100));
        cart.add_item(&product("b", 100));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.compute_totals(), MoneyTotals::default());
    }

    // =========================================================================
    // compute_totals
    // =========================================================================

    #[test]
    fn test_totals_empty_cart() {
        let totals = CartEngine::new(store()).compute_totals();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.tax, Money::ZERO);
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn test_totals_ten_dollars_times_two() {
        let mut cart = CartEngine::new(store());
        let a = product("a", 1000);
        cart.add_item(&a);
        cart.set_quantity(&a.id, 2).unwrap();

        let totals = cart.compute_totals();
        assert_eq!(totals.subtotal.to_string(), "$20.00");
        assert_eq!(totals.tax.to_string(), "$1.75");
        assert_eq!(totals.total.to_string(), "$21.75");
    }

    #[test]
    fn test_totals_are_idempotent() {
        let mut cart = CartEngine::new(store());
        cart.add_item(&product("a", 333));
        cart.add_item(&product("b", 1999));
        assert_eq!(cart.compute_totals(), cart.compute_totals());
    }

    #[test]
    fn test_totals_no_drift_over_many_small_items() {
        let mut cart = CartEngine::new(store());
        for i in 0..100 {
            cart.add_item(&product(&format!("p{i}"), 10));
        }
        assert_eq!(cart.compute_totals().subtotal, Money::from_cents(1000));
    }

    #[test]
    fn test_custom_tax_policy() {
        let policy = Arc::new(FlatRateTax::new(Decimal::new(5, 2)));
        let mut cart = CartEngine::with_tax_policy(store(), policy);
        cart.add_item(&product("a", 1000));

        let totals = cart.compute_totals();
        assert_eq!(totals.tax, Money::from_cents(50));
        assert_eq!(totals.total, Money::from_cents(1050));
    }
}
