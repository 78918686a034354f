//! Sellable products scoped to a location.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;

/// A product in a location's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current catalog price. Carts snapshot this when the product is added.
    pub unit_price: Money,
    pub sku: Option<String>,
    /// Category tags used by the register's category tabs.
    #[serde(default)]
    pub category_tags: Vec<String>,
}

impl Product {
    /// Whether the product carries `tag` (exact match).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.category_tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match on the product name.
    ///
    /// `lowercase_needle` must already be lowercased, so a search over many
    /// products lowercases it once. An empty needle matches every product.
    #[must_use]
    pub fn name_contains(&self, lowercase_needle: &str) -> bool {
        lowercase_needle.is_empty() || self.name.to_lowercase().contains(lowercase_needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> Product {
        Product {
            id: ProductId::new("p-1"),
            name: "Classic Tee".to_string(),
            unit_price: Money::from_cents(1500),
            sku: Some("TEE-001".to_string()),
            category_tags: vec!["Summer sale".to_string()],
        }
    }

    #[test]
    fn test_has_tag() {
        assert!(tee().has_tag("Summer sale"));
        assert!(!tee().has_tag("summer sale"));
        assert!(!tee().has_tag("Clearance"));
    }

    #[test]
    fn test_name_contains_ignores_case() {
        assert!(tee().name_contains("tee"));
        assert!(tee().name_contains("classic t"));
        assert!(tee().name_contains(""));
        assert!(!tee().name_contains("jacket"));
    }
}
