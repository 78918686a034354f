//! Back-office API access.
//!
//! # Architecture
//!
//! - [`BackOffice`] is the seam between the register and the network. The
//!   register only ever talks to this trait, so tests can swap in an
//!   in-memory implementation.
//! - [`HttpBackOffice`] implements it over JSON/HTTP with `reqwest`.
//! - Wire records are converted to `till-core` domain types in
//!   `conversions`; malformed products are skipped, not fatal.
//!
//! # Endpoints
//!
//! - `POST /auth/login` - operator login
//! - `GET /companies` - companies visible to the operator
//! - `GET /companies/{id}/locations` - locations of one company
//! - `GET /products?location_id={id}` - sellable products at one location
//!
//! Every call is an ordinary future: dropping it cancels the request.

mod conversions;
mod http;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;
use till_core::{Company, CompanyId, Location, LocationId, Product, User};

pub use http::HttpBackOffice;

/// Errors that can occur when talking to the back office.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The back office answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body, for diagnostics.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The back office rejected the operator's credentials.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Operator login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The four back-office calls the register depends on.
pub trait BackOffice: Send + Sync {
    /// Verify operator credentials.
    ///
    /// Fails with [`ApiError::InvalidCredentials`] when the back office
    /// rejects them.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    /// Companies the operator may sell for. An empty list is not an error.
    fn list_companies(&self) -> impl Future<Output = Result<Vec<Company>, ApiError>> + Send;

    /// Locations of one company. An empty list is not an error.
    fn list_locations(
        &self,
        company_id: &CompanyId,
    ) -> impl Future<Output = Result<Vec<Location>, ApiError>> + Send;

    /// Products sellable at one location.
    fn load_catalog(
        &self,
        location_id: &LocationId,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;
}
