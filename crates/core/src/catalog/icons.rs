//! Display icons for products.
//!
//! Cosmetic only: icons are derived from product names at render time and
//! never stored in the cart.

use crate::types::Product;

/// Picks a display icon for a product.
pub trait IconLookup {
    fn icon_for(&self, product: &Product) -> &'static str;
}

/// Keyword table matched against the lower-cased product name.
///
/// The first matching row wins; unmatched products get a parcel.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIcons;

const KEYWORDS: &[(&[&str], &str)] = &[
    (&["shirt", "tee"], "👕"),
    (&["jacket", "coat"], "🧥"),
    (&["pant", "jean", "denim"], "👖"),
    (&["bag", "satchel"], "👜"),
    (&["shoe", "sneaker"], "👟"),
    (&["hat", "cap"], "🎩"),
    (&["dress"], "👗"),
    (&["sweater", "sweatshirt"], "🧶"),
];

const FALLBACK: &str = "📦";

impl IconLookup for KeywordIcons {
    fn icon_for(&self, product: &Product) -> &'static str {
        let name = product.name.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(words, _)| words.iter().any(|w| name.contains(w)))
            .map_or(FALLBACK, |(_, icon)| icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Money, ProductId};

    fn named(name: &str) -> Product {
        Product {
            id: ProductId::new(name),
            name: name.to_string(),
            unit_price: Money::ZERO,
            sku: None,
            category_tags: Vec::new(),
        }
    }

    #[test]
    fn test_keyword_icons() {
        let icons = KeywordIcons;
        assert_eq!(icons.icon_for(&named("Oxford Shirt")), "👕");
        assert_eq!(icons.icon_for(&named("Rain COAT")), "🧥");
        assert_eq!(icons.icon_for(&named("Slim Jeans")), "👖");
        assert_eq!(icons.icon_for(&named("Leather Satchel")), "👜");
        assert_eq!(icons.icon_for(&named("Summer Dress")), "👗");
        assert_eq!(icons.icon_for(&named("Gift Card")), "📦");
    }

    #[test]
    fn test_first_match_wins() {
        // "Denim Jacket" hits the jacket row before the denim row.
        assert_eq!(KeywordIcons.icon_for(&named("Denim Jacket")), "🧥");
    }
}
