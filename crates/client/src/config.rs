//! Register configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TILL_API_BASE_URL` - Back-office API root (default: `http://localhost:5000/api`)
//! - `TILL_REQUEST_TIMEOUT_SECS` - Per-request timeout, 1-300 (default: 15)
//! - `TILL_TAX_RATE` - Flat tax rate as a fraction, in `[0, 1)` (default: 0.0875)
//! - `TILL_OPERATOR` - Operator username for non-interactive use
//! - `TILL_PASSWORD` - Operator password for non-interactive use

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use till_core::FlatRateTax;
use url::Url;

use crate::api::Credentials;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Register configuration.
#[derive(Debug, Clone)]
pub struct TillConfig {
    /// Back-office API configuration
    pub api: ApiConfig,
    /// Flat tax rate applied to every sale
    pub tax_rate: Decimal,
    /// Operator credentials, if provided through the environment
    pub operator: Option<OperatorConfig>,
}

/// Back-office API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root; endpoint paths are appended to it
    pub base_url: Url,
    /// Timeout applied to every request
    pub timeout: Duration,
}

/// Operator credentials from the environment.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct OperatorConfig {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl OperatorConfig {
    /// Credentials for `BackOffice::authenticate`.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl TillConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if
    /// only one of `TILL_OPERATOR` and `TILL_PASSWORD` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// See [`TillConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = parse_base_url(
            "TILL_API_BASE_URL",
            &lookup("TILL_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;
        let timeout = parse_timeout(
            "TILL_REQUEST_TIMEOUT_SECS",
            lookup("TILL_REQUEST_TIMEOUT_SECS").as_deref(),
        )?;
        let tax_rate = parse_tax_rate("TILL_TAX_RATE", lookup("TILL_TAX_RATE").as_deref())?;

        let operator = match (lookup("TILL_OPERATOR"), lookup("TILL_PASSWORD")) {
            (Some(username), Some(password)) => Some(OperatorConfig {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("TILL_PASSWORD".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("TILL_OPERATOR".to_string())),
        };

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            tax_rate,
            operator,
        })
    }

    /// Tax policy built from [`TillConfig::tax_rate`].
    #[must_use]
    pub const fn tax_policy(&self) -> FlatRateTax {
        FlatRateTax::new(self.tax_rate)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the API base URL (http or https only).
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse the request timeout in whole seconds.
fn parse_timeout(key: &str, value: Option<&str>) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    };
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds (got {secs})"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a tax rate fraction in `[0, 1)`.
fn parse_tax_rate(key: &str, value: Option<&str>) -> Result<Decimal, ConfigError> {
    let Some(value) = value else {
        return Ok(FlatRateTax::DEFAULT_RATE);
    };
    let rate = Decimal::from_str(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be a fraction in [0, 1) (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<TillConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TillConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.tax_rate, FlatRateTax::DEFAULT_RATE);
        assert!(config.operator.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TILL_API_BASE_URL", "https://backoffice.example.com/v2"),
            ("TILL_REQUEST_TIMEOUT_SECS", "30"),
            ("TILL_TAX_RATE", "0.05"),
            ("TILL_OPERATOR", "sam"),
            ("TILL_PASSWORD", "hunter2"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.host_str(), Some("backoffice.example.com"));
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.tax_rate, Decimal::new(5, 2));
        let operator = config.operator.unwrap();
        assert_eq!(operator.username, "sam");
        assert_eq!(operator.password.expose_secret(), "hunter2");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            load(&[("TILL_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("TILL_API_BASE_URL", "ftp://files.example.com")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_timeout_bounds() {
        assert!(load(&[("TILL_REQUEST_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("TILL_REQUEST_TIMEOUT_SECS", "301")]).is_err());
        assert!(load(&[("TILL_REQUEST_TIMEOUT_SECS", "ten")]).is_err());
        assert!(load(&[("TILL_REQUEST_TIMEOUT_SECS", "300")]).is_ok());
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(load(&[("TILL_TAX_RATE", "-0.01")]).is_err());
        assert!(load(&[("TILL_TAX_RATE", "1")]).is_err());
        assert!(load(&[("TILL_TAX_RATE", "abc")]).is_err());
        assert_eq!(load(&[("TILL_TAX_RATE", "0")]).unwrap().tax_rate, Decimal::ZERO);
    }

    #[test]
    fn test_operator_requires_both_vars() {
        assert!(matches!(
            load(&[("TILL_OPERATOR", "sam")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "TILL_PASSWORD"
        ));
        assert!(matches!(
            load(&[("TILL_PASSWORD", "hunter2")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "TILL_OPERATOR"
        ));
    }

    #[test]
    fn test_operator_debug_redacts_password() {
        let operator = OperatorConfig {
            username: "sam".to_string(),
            password: SecretString::from("super_secret_password"),
        };
        let debug_output = format!("{operator:?}");
        assert!(debug_output.contains("sam"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
