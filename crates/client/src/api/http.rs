//! JSON-over-HTTP back-office client.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use till_core::{Company, CompanyId, Location, LocationId, Product, User};
use tracing::{debug, instrument, warn};
use url::Url;

use super::conversions::{
    CompanyRecord, LocationRecord, LoginRequest, ProductRecord, UserRecord, convert_company,
    convert_location, convert_product, convert_user,
};
use super::{ApiError, BackOffice, Credentials};
use crate::config::ApiConfig;

/// Maximum number of body characters kept in error messages and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Back-office client over JSON/HTTP.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpBackOffice {
    inner: Arc<HttpBackOfficeInner>,
}

struct HttpBackOfficeInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackOffice {
    /// Create a client for the configured API root.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("till/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackOfficeInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// API root with `segments` appended as escaped path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and decode a JSON body, mapping failures to `ApiError`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %truncate(&body),
                    "Back office returned non-success status"
                );
            } else {
                warn!(status = %status, body = %truncate(&body), "Back office refused request");
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse back-office response"
            );
            ApiError::Parse(e)
        })
    }
}

impl BackOffice for HttpBackOffice {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth", "login"]))
            .json(&LoginRequest {
                username: &credentials.username,
                password: credentials.password.expose_secret(),
            });

        // Only the login endpoint treats 401/403 as rejected credentials.
        let record: UserRecord = match self.send_json(request).await {
            Err(ApiError::Status { status, .. }) if is_auth_rejection(status) => {
                return Err(ApiError::InvalidCredentials);
            }
            other => other?,
        };
        let user = convert_user(record);
        debug!(user_id = %user.id, "Operator authenticated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        let request = self.inner.client.get(self.endpoint(&["companies"]));
        let records: Vec<CompanyRecord> = self.send_json(request).await?;
        debug!(count = records.len(), "Fetched companies");
        Ok(records.into_iter().map(convert_company).collect())
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn list_locations(&self, company_id: &CompanyId) -> Result<Vec<Location>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint(&["companies", company_id.as_str(), "locations"]));
        let records: Vec<LocationRecord> = self.send_json(request).await?;
        debug!(count = records.len(), "Fetched locations");
        Ok(records
            .into_iter()
            .map(|record| convert_location(record, company_id))
            .collect())
    }

    #[instrument(skip(self), fields(location_id = %location_id))]
    async fn load_catalog(&self, location_id: &LocationId) -> Result<Vec<Product>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint(&["products"]))
            .query(&[("location_id", location_id.as_str())]);
        let records: Vec<ProductRecord> = self.send_json(request).await?;
        let total = records.len();
        let products: Vec<Product> = records.into_iter().filter_map(convert_product).collect();
        debug!(total, usable = products.len(), "Fetched catalog");
        Ok(products)
    }
}

/// Timeouts get their own variant so callers can tell them apart.
fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(error)
    }
}

const fn is_auth_rejection(status: u16) -> bool {
    status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
