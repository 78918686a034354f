//! Till Core - point-of-sale domain library.
//!
//! This crate holds the parts of the Till register that carry invariants:
//! - [`selection`] - company/location selection producing an immutable [`Session`]
//! - [`cart`] - the cart engine: line items, quantities and money totals
//! - [`catalog`] - the location-scoped product view and its filters
//!
//! # Architecture
//!
//! The core crate contains only types and state machines - no I/O, no async
//! runtime, no HTTP clients. Network calls live in `till-client`, which feeds
//! their results back into the state machines defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, org reference data, sessions and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod selection;
pub mod types;

pub use cart::{CartEngine, CartError, FlatRateTax, LineItem, MoneyTotals, TaxPolicy};
pub use catalog::{
    Catalog, CatalogTicket, CategoryFilter, DEFAULT_CATEGORIES, IconLookup, KeywordIcons,
    LoadOutcome, filter_catalog,
};
pub use selection::{ContextSelection, LocationTicket, SelectionError, SelectionState};
pub use types::*;
