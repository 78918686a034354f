//! End-to-end tests for the Till register.
//!
//! Every test starts an `httpmock` server standing in for the back office,
//! points an [`HttpBackOffice`] at it and drives a [`Register`] through the
//! same calls a UI would make.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p till-integration-tests
//! ```
//!
//! # Fixtures
//!
//! [`BackOfficeFixture::standard`] mounts one operator (`sam` / `pw`), two
//! companies (`1` Acme, `2` Globex) with their locations, and a two-product
//! catalog at location `10`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::{Value, json};
use till_client::{ApiConfig, Credentials, HttpBackOffice, Register};
use url::Url;

/// Mock back office with the standard fixture data mounted.
pub struct BackOfficeFixture {
    pub server: MockServer,
}

impl BackOfficeFixture {
    /// Start a server with no routes mounted.
    pub async fn empty() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// Start a server with login, companies, locations and one catalog.
    pub async fn standard() -> Self {
        let fixture = Self::empty().await;
        fixture.mount_login().await;
        fixture
            .mount_json(
                "/api/companies",
                json!([{"id": 1, "name": "Acme"}, {"id": 2, "name": "Globex"}]),
            )
            .await;
        fixture
            .mount_json(
                "/api/companies/1/locations",
                json!([
                    {"id": 10, "name": "Downtown", "address": "1 Main St", "city": "Springfield", "company_id": 1},
                    {"id": 11, "name": "Mall", "address": "5 Mall Rd", "city": "Shelbyville", "company_id": 1}
                ]),
            )
            .await;
        fixture
            .mount_json(
                "/api/companies/2/locations",
                json!([
                    {"id": 20, "name": "Harbor", "address": "9 Dock St", "city": "Capital City", "company_id": 2}
                ]),
            )
            .await;
        fixture.mount_catalog("10", standard_catalog()).await;
        fixture
    }

    /// Accept `sam` / `pw`, reject everything else.
    pub async fn mount_login(&self) {
        self.server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/auth/login")
                    .json_body(json!({"username": "sam", "password": "pw"}));
                then.status(200)
                    .json_body(json!({"id": 7, "full_name": "Sam Carter"}));
            })
            .await;
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/login");
                then.status(401).body("invalid credentials");
            })
            .await;
    }

    /// Serve `body` for `GET path`.
    pub async fn mount_json(&self, path: &str, body: Value) -> httpmock::Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).json_body(body);
            })
            .await
    }

    /// Serve `body` as the catalog of `location_id`.
    pub async fn mount_catalog(&self, location_id: &str, body: Value) -> httpmock::Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/products")
                    .query_param("location_id", location_id);
                then.status(200).json_body(body);
            })
            .await
    }

    /// Register pointed at this server.
    pub fn register(&self) -> Register<HttpBackOffice> {
        Register::new(self.back_office(Duration::from_secs(5)))
    }

    pub fn back_office(&self, timeout: Duration) -> HttpBackOffice {
        HttpBackOffice::new(&ApiConfig {
            base_url: Url::parse(&self.server.url("/api")).unwrap(),
            timeout,
        })
        .unwrap()
    }
}

/// Two products: a 10.00 tee tagged Favorites and a 7.25 cap on sale.
#[must_use]
pub fn standard_catalog() -> Value {
    json!([
        {"id": "tee", "name": "Classic Tee", "price": "10.00", "sku": "TEE-1", "tags": ["Favorites"]},
        {"id": "cap", "name": "Trucker Cap", "price": 7.25, "category": "Summer sale"}
    ])
}

#[must_use]
pub fn operator() -> Credentials {
    Credentials::new("sam", "pw")
}
