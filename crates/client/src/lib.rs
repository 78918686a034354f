//! Till Client - back-office access and the register controller.
//!
//! # Modules
//!
//! - [`api`] - the [`BackOffice`] seam and its JSON/HTTP implementation
//! - [`config`] - environment-based configuration
//! - [`register`] - the [`Register`] controller driving login, selection and sales
//! - [`receipt`] - the record produced by checkout
//! - [`error`] - the register-level [`PosError`] taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use till_client::{Credentials, HttpBackOffice, Register, TillConfig};
//! use till_core::{CompanyId, LocationId, ProductId};
//!
//! # async fn run() -> till_client::Result<()> {
//! let config = TillConfig::from_env()?;
//! let back_office = HttpBackOffice::new(&config.api)
//!     .map_err(till_client::PosError::ServiceUnavailable)?;
//! let mut register = Register::new(back_office);
//!
//! register.login(&Credentials::new("sam", "secret")).await?;
//! register.load_companies().await?;
//! register.select_company(&CompanyId::new("1")).await?;
//! register.select_location(&LocationId::new("10"))?;
//! register.start_session().await?;
//! register.add_item(&ProductId::new("tee"))?;
//! let receipt = register.checkout()?;
//! println!("{receipt}");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod receipt;
pub mod register;

pub use api::{ApiError, BackOffice, Credentials, HttpBackOffice};
pub use config::{ApiConfig, ConfigError, OperatorConfig, TillConfig};
pub use error::{PosError, Result};
pub use receipt::{Receipt, ReceiptLine};
pub use register::Register;
