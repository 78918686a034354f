//! Register-level error taxonomy.
//!
//! Every error here is recoverable: the operator retries, re-enters
//! credentials, or corrects a selection. Transport-level detail is kept as the
//! error source of [`PosError::ServiceUnavailable`].

use thiserror::Error;
use till_core::{CartError, SelectionError};

use crate::api::ApiError;
use crate::config::ConfigError;

/// Errors surfaced by the register.
#[derive(Debug, Error)]
pub enum PosError {
    /// The back office rejected the operator's credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A company/location choice violated the selection rules.
    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    /// The back office could not be reached or answered unusably.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(#[source] ApiError),

    /// The referenced product or cart line does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The operation is not available in the register's current phase.
    #[error("Not available while {0}")]
    WrongPhase(&'static str),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PosError {
    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<ApiError> for PosError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::InvalidCredentials => Self::InvalidCredentials,
            other => Self::ServiceUnavailable(other),
        }
    }
}

impl From<CartError> for PosError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::NotFound(product_id) => Self::NotFound(format!("cart line for product {product_id}")),
        }
    }
}

/// Result type alias for `PosError`.
pub type Result<T> = std::result::Result<T, PosError>;
