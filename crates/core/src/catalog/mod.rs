//! The location-scoped product catalog and the register's product view.
//!
//! [`Catalog`] holds the last successfully loaded product set. Loads are
//! issued as [`CatalogTicket`]s: a result is only applied if its ticket is
//! still the newest one, and a failed load never clears products that were
//! already loaded.

mod icons;

use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub use icons::{IconLookup, KeywordIcons};

use crate::types::{LocationId, Product, ProductId};

/// Category tabs shown by the register, in display order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "All items",
    "Favorites",
    "Summer sale",
    "Clearance",
    "New arrivals",
];

/// Category tab selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Products tagged with this category.
    Tag(String),
}

impl CategoryFilter {
    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => product.has_tag(tag),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    /// `"All"`, `"All items"` and the empty string select everything; any
    /// other label is a tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("all items") {
            Ok(Self::All)
        } else {
            Ok(Self::Tag(s.to_owned()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Products matching both the category filter and the search text.
///
/// The view is lazy and order-preserving. It borrows `products` without
/// modifying them; clone the iterator to walk it again, or call this function
/// again after the inputs change.
pub fn filter_catalog<'a>(
    products: &'a [Product],
    filter: &'a CategoryFilter,
    search: &str,
) -> impl Iterator<Item = &'a Product> + Clone + use<'a> {
    let needle = search.to_lowercase();
    products
        .iter()
        .filter(move |product| filter.matches(product) && product.name_contains(&needle))
}

/// Result of delivering a response for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was current and has been applied.
    Applied,
    /// A newer request superseded this one; the response was dropped.
    Stale,
}

/// Handle for one in-flight catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTicket {
    location_id: LocationId,
    epoch: u64,
}

impl CatalogTicket {
    /// Location whose products should be fetched.
    #[must_use]
    pub const fn location_id(&self) -> &LocationId {
        &self.location_id
    }
}

/// The products sellable at one location.
#[derive(Debug, Clone)]
pub struct Catalog {
    location_id: LocationId,
    products: Vec<Product>,
    epoch: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Empty, not-yet-loaded catalog for `location_id`.
    #[must_use]
    pub const fn new(location_id: LocationId) -> Self {
        Self {
            location_id,
            products: Vec::new(),
            epoch: 0,
            loaded_at: None,
        }
    }

    /// Start a load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> CatalogTicket {
        self.epoch += 1;
        CatalogTicket {
            location_id: self.location_id.clone(),
            epoch: self.epoch,
        }
    }

    /// Deliver the result of a load.
    ///
    /// Stale tickets are ignored whatever their result. On success the
    /// products are replaced; on failure the previous products are kept.
    ///
    /// # Errors
    ///
    /// Returns the load's own error when a current ticket failed.
    pub fn apply<E>(
        &mut self,
        ticket: &CatalogTicket,
        result: Result<Vec<Product>, E>,
    ) -> Result<LoadOutcome, E> {
        if ticket.epoch != self.epoch || ticket.location_id != self.location_id {
            warn!(
                location_id = %ticket.location_id,
                "Dropping superseded catalog response"
            );
            return Ok(LoadOutcome::Stale);
        }
        let products = result?;
        debug!(
            location_id = %self.location_id,
            count = products.len(),
            "Catalog loaded"
        );
        self.products = products;
        self.loaded_at = Some(Utc::now());
        Ok(LoadOutcome::Applied)
    }

    #[must_use]
    pub const fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    /// Products in the order the back office returned them.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// See [`filter_catalog`].
    pub fn filtered<'a>(
        &'a self,
        filter: &'a CategoryFilter,
        search: &str,
    ) -> impl Iterator<Item = &'a Product> + Clone + use<'a> {
        filter_catalog(&self.products, filter, search)
    }

    /// Whether at least one load has succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    /// When the current products were loaded.
    #[must_use]
    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
