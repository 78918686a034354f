//! Tax policies and derived cart totals.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Location, Money};

/// Computes the tax owed on a subtotal at a location.
///
/// The register ships with [`FlatRateTax`]; deployments with per-location
/// rules can plug in their own implementation.
pub trait TaxPolicy: fmt::Debug + Send + Sync {
    /// Tax owed on `subtotal` when selling at `location`.
    fn tax(&self, subtotal: Money, location: &Location) -> Money;
}

/// A single, location-independent tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRateTax {
    rate: Decimal,
}

impl FlatRateTax {
    /// 8.75%.
    pub const DEFAULT_RATE: Decimal = Decimal::from_parts(875, 0, 0, false, 4);

    /// Create a policy charging `rate` (a fraction, e.g. `0.0875`).
    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }
}

impl Default for FlatRateTax {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE)
    }
}

impl TaxPolicy for FlatRateTax {
    fn tax(&self, subtotal: Money, _location: &Location) -> Money {
        subtotal.scale(self.rate).round_to_cents()
    }
}

/// Subtotal, tax and total for a cart at one point in time.
///
/// Always derived from the cart; never stored alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoneyTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl MoneyTotals {
    pub(crate) fn from_subtotal(subtotal: Money, tax: Money) -> Self {
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
