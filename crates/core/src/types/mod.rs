//! Core types for Till.
//!
//! This module provides type-safe wrappers for the register's domain concepts.

pub mod id;
pub mod money;
pub mod org;
pub mod product;
pub mod session;

pub use id::*;
pub use money::{Money, MoneyError};
pub use org::{Company, Location, User};
pub use product::Product;
pub use session::Session;
