//! Sale receipts.
//!
//! A receipt is a frozen copy of the cart at checkout. No payment is taken;
//! the receipt is what the operator charges against.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use till_core::{CartEngine, Money, MoneyTotals, ProductId, Session};
use uuid::Uuid;

/// One line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub sale_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub operator: String,
    pub company: String,
    /// `"name, address, city"` of the selling location.
    pub location: String,
    pub lines: Vec<ReceiptLine>,
    pub totals: MoneyTotals,
}

impl Receipt {
    pub(crate) fn from_cart(session: &Session, cart: &CartEngine) -> Self {
        Self {
            sale_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            operator: session.user().display_name.clone(),
            company: session.company().name.clone(),
            location: session.location().summary(),
            lines: cart
                .lines()
                .iter()
                .map(|line| ReceiptLine {
                    product_id: line.product_id().clone(),
                    name: line.name().to_string(),
                    sku: line.sku().map(str::to_string),
                    quantity: line.quantity(),
                    unit_price: line.unit_price(),
                    line_total: line.line_total(),
                })
                .collect(),
            totals: cart.compute_totals(),
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.company)?;
        writeln!(f, "{}", self.location)?;
        writeln!(f, "Sale {} by {}", self.sale_id, self.operator)?;
        writeln!(f, "{}", self.completed_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{} × {}  {}", line.name, line.quantity, line.line_total)?;
        }
        writeln!(f)?;
        writeln!(f, "Subtotal  {}", self.totals.subtotal)?;
        writeln!(f, "Tax       {}", self.totals.tax)?;
        write!(f, "Total     {}", self.totals.total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use till_core::{Company, CompanyId, Location, LocationId, Product, User, UserId};

    use super::*;

    fn session() -> Session {
        let company = Company {
            id: CompanyId::new("acme"),
            name: "Acme Outfitters".to_string(),
        };
        let location = Location {
            id: LocationId::new("l1"),
            name: "Downtown".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            company_id: company.id.clone(),
        };
        let user = User {
            id: UserId::new("u1"),
            display_name: "Sam".to_string(),
        };
        Session::new(user, company, location).unwrap()
    }

    #[test]
    fn test_receipt_copies_cart() {
        let session = session();
        let mut cart = CartEngine::new(session.location().clone());
        let tee = Product {
            id: ProductId::new("tee"),
            name: "Classic Tee".to_string(),
            unit_price: Money::from_cents(1000),
            sku: Some("TEE-1".to_string()),
            category_tags: Vec::new(),
        };
        cart.add_item(&tee);
        cart.add_item(&tee);

        let receipt = Receipt::from_cart(&session, &cart);

        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].quantity, 2);
        assert_eq!(receipt.lines[0].line_total, Money::from_cents(2000));
        assert_eq!(receipt.totals.total, Money::from_cents(2175));
        assert_eq!(receipt.location, "Downtown, 1 Main St, Springfield");

        let text = receipt.to_string();
        assert!(text.contains("Classic Tee × 2  $20.00"));
        assert!(text.contains("Total     $21.75"));
    }
}
