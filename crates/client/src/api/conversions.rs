//! Wire records and their conversion into domain types.

use serde::{Deserialize, Serialize};
use till_core::{Company, CompanyId, Location, LocationId, Money, Product, ProductId, User, UserId};
use tracing::warn;

// =============================================================================
// Requests
// =============================================================================

#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct UserRecord {
    id: UserId,
    #[serde(alias = "full_name", alias = "fullName", alias = "name")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompanyRecord {
    id: CompanyId,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationRecord {
    id: LocationId,
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "companyId")]
    company_id: Option<CompanyId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductRecord {
    id: ProductId,
    name: String,
    price: PriceValue,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default, alias = "categories", alias = "tags")]
    category_tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Prices arrive either as decimal strings (`"19.99"`) or JSON numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Number(serde_json::Number),
}

impl PriceValue {
    fn parse(&self) -> Result<Money, till_core::MoneyError> {
        match self {
            Self::Text(s) => Money::parse(s),
            Self::Number(n) => Money::parse(&n.to_string()),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

pub(super) fn convert_user(record: UserRecord) -> User {
    User {
        id: record.id,
        display_name: record.display_name,
    }
}

pub(super) fn convert_company(record: CompanyRecord) -> Company {
    Company {
        id: record.id,
        name: record.name,
    }
}

/// Locations that omit their owner are attributed to the requested company.
pub(super) fn convert_location(record: LocationRecord, requested: &CompanyId) -> Location {
    Location {
        id: record.id,
        name: record.name,
        address: record.address.unwrap_or_default(),
        city: record.city.unwrap_or_default(),
        company_id: record.company_id.unwrap_or_else(|| requested.clone()),
    }
}

/// Returns `None` (and logs) for products whose price is unusable.
pub(super) fn convert_product(record: ProductRecord) -> Option<Product> {
    let unit_price = match record.price.parse() {
        Ok(price) => price,
        Err(e) => {
            warn!(product_id = %record.id, error = %e, "Skipping product with invalid price");
            return None;
        }
    };

    let mut category_tags = record.category_tags;
    if let Some(category) = record.category
        && !category_tags.contains(&category)
    {
        category_tags.push(category);
    }

    Some(Product {
        id: record.id,
        name: record.name,
        unit_price,
        sku: record.sku.filter(|s| !s.is_empty()),
        category_tags,
    })
}
