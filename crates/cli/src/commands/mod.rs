//! Subcommand implementations and the helpers they share.

pub mod browse;
pub mod sale;

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use till_client::{Credentials, HttpBackOffice, PosError, Register, TillConfig};
use till_core::{CompanyId, LocationId, ProductId};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Register operation failed.
    #[error(transparent)]
    Pos(#[from] PosError),

    /// No operator credentials were configured.
    #[error("Operator credentials missing: set TILL_OPERATOR and TILL_PASSWORD")]
    MissingCredentials,

    /// Receipt could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A `--item` argument: a product ID with an optional quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once('=') {
            Some((id, qty)) => {
                let qty = qty
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("invalid quantity in '{s}': {e}"))?;
                (id.trim(), Some(qty))
            }
            None => (s.trim(), None),
        };
        if id.is_empty() {
            return Err(format!("missing product ID in '{s}'"));
        }
        Ok(Self {
            product_id: ProductId::new(id),
            quantity,
        })
    }
}

/// Load configuration and log the operator in.
///
/// `operator` replaces the configured username.
pub async fn open_register(
    operator: Option<&str>,
) -> Result<Register<HttpBackOffice>, CommandError> {
    let config = TillConfig::from_env().map_err(PosError::from)?;
    let configured = config
        .operator
        .as_ref()
        .ok_or(CommandError::MissingCredentials)?;
    let credentials = match operator {
        Some(username) => Credentials::new(username, configured.password.clone()),
        None => configured.credentials(),
    };

    let back_office = HttpBackOffice::new(&config.api).map_err(PosError::ServiceUnavailable)?;
    let mut register = Register::with_tax_policy(back_office, Arc::new(config.tax_policy()));
    register.login(&credentials).await?;
    Ok(register)
}

/// Log in and start selling at `location`.
pub async fn open_session(
    operator: Option<&str>,
    company: &CompanyId,
    location: &LocationId,
) -> Result<Register<HttpBackOffice>, CommandError> {
    let mut register = open_register(operator).await?;
    register.load_companies().await?;
    register.select_company(company).await?;
    register.select_location(location)?;
    register.start_session().await?;
    Ok(register)
}
