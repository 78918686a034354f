//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::types::{Money, Product, ProductId};

/// One distinct product's accumulated quantity within a cart.
///
/// The unit price is captured when the product is first added, so reloading
/// the catalog with new prices never changes an open cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    product_id: ProductId,
    name: String,
    sku: Option<String>,
    quantity: u32,
    unit_price: Money,
}

impl LineItem {
    /// Largest quantity a line can hold.
    pub const MAX_QUANTITY: u32 = 99_999;

    /// Start a line for `product` at quantity 1.
    #[must_use]
    pub(crate) fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            quantity: 1,
            unit_price: product.unit_price,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Product name at the time it was added.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price snapshot taken at add time.
    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Stops at [`MAX_QUANTITY`](Self::MAX_QUANTITY).
    pub(crate) const fn bump(&mut self) {
        if self.quantity < Self::MAX_QUANTITY {
            self.quantity += 1;
        }
    }

    /// Callers guarantee `quantity >= 1`. Clamped to
    /// [`MAX_QUANTITY`](Self::MAX_QUANTITY).
    pub(crate) const fn set_quantity(&mut self, quantity: u32) {
        self.quantity = if quantity > Self::MAX_QUANTITY {
            Self::MAX_QUANTITY
        } else {
            quantity
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap() -> Product {
        Product {
            id: ProductId::new("cap"),
            name: "Snapback Cap".to_string(),
            unit_price: Money::from_cents(1250),
            sku: None,
            category_tags: Vec::new(),
        }
    }

    #[test]
    fn test_new_line_starts_at_one() {
        let line = LineItem::from_product(&cap());
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.unit_price(), Money::from_cents(1250));
        assert_eq!(line.name(), "Snapback Cap");
        assert_eq!(line.sku(), None);
    }

    #[test]
    fn test_line_total() {
        let mut line = LineItem::from_product(&cap());
        line.set_quantity(3);
        assert_eq!(line.line_total(), Money::from_cents(3750));
    }

    #[test]
    fn test_quantity_stops_at_max() {
        let mut line = LineItem::from_product(&cap());
        line.set_quantity(u32::MAX);
        assert_eq!(line.quantity(), LineItem::MAX_QUANTITY);
        line.bump();
        assert_eq!(line.quantity(), LineItem::MAX_QUANTITY);
    }
}
