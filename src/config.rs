//! # Gateway Configuration
//!
//! Loads [`GatewayConfig`] from environment variables with the `config`
//! crate. [`GatewayConfig::from_env`] first loads a `.env` file when one is
//! present; [`GatewayConfig::from_vars`] takes the variables explicitly so
//! tests never touch the process environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SERVICE_NAME` | `delivro-logistic` |
//! | `LOG_LEVEL` / `LOG_FORMAT` | `info` / `json` |
//! | `FREIGHTCOM_API_KEY` | |
//! | `FREIGHTCOM_BASE_URL` | `https://api.freightcom.com/v1` |
//! | `FREIGHTCOM_PAYMENT_METHOD_ID` | `0` |
//! | `FREIGHTCOM_POLL_INTERVAL_MS` / `FREIGHTCOM_POLL_TIMEOUT_MS` | `500` / `30000` |
//! | `CANADAPOST_API_KEY` / `CANADAPOST_API_SECRET` / `CANADAPOST_ACCOUNT_ID` | |
//! | `CANADAPOST_BASE_URL` | `https://soa-gw.canadapost.ca` |
//! | `PUROLATOR_USERNAME` / `PUROLATOR_PASSWORD` / `PUROLATOR_ACCOUNT_NUMBER` | |
//! | `PUROLATOR_WSDL_URL` | `https://webservices.purolator.com` |
//! | `{CARRIER}_ENABLED` / `{CARRIER}_USE_MOCK` | `true` / `false` |
//! | `HTTP_TIMEOUT_MS` | `30000` |
//! | `CARRIER_TIMEOUT_MS` | unset |

use crate::application::services::registry::RegistryConfig;
use crate::domain::error::CarrierError;
use crate::infrastructure::carriers::canadapost::CanadaPostConfig;
use crate::infrastructure::carriers::canadapost::adapter::DEFAULT_BASE_URL as CANADAPOST_BASE_URL;
use crate::infrastructure::carriers::freightcom::FreightcomConfig;
use crate::infrastructure::carriers::freightcom::adapter::DEFAULT_BASE_URL as FREIGHTCOM_BASE_URL;
use crate::infrastructure::carriers::purolator::PurolatorConfig;
use crate::infrastructure::carriers::purolator::adapter::DEFAULT_BASE_URL as PUROLATOR_BASE_URL;
use crate::telemetry::{LogFormat, TelemetryConfig};
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// An enabled live carrier lacks a credential.
    #[error("{carrier} is enabled but {variable} is not set")]
    MissingCredential {
        /// Carrier name.
        carrier: &'static str,
        /// Environment variable that must be set.
        variable: &'static str,
    },

    /// A value is present but unusable.
    #[error("invalid value for {variable}: {message}")]
    Invalid {
        /// Environment variable.
        variable: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A carrier adapter could not be built from its settings.
    #[error("failed to build carrier: {0}")]
    Carrier(#[from] CarrierError),
}

/// Flat view of the environment, keyed by lowercased variable name.
#[derive(Debug, Deserialize)]
struct RawSettings {
    service_name: String,
    log_level: String,
    log_format: String,

    freightcom_api_key: String,
    freightcom_base_url: String,
    freightcom_enabled: bool,
    freightcom_use_mock: bool,
    freightcom_payment_method_id: i64,
    freightcom_poll_interval_ms: u64,
    freightcom_poll_timeout_ms: u64,

    canadapost_api_key: String,
    canadapost_api_secret: String,
    canadapost_account_id: String,
    canadapost_base_url: String,
    canadapost_enabled: bool,
    canadapost_use_mock: bool,

    purolator_username: String,
    purolator_password: String,
    purolator_account_number: String,
    purolator_wsdl_url: String,
    purolator_enabled: bool,
    purolator_use_mock: bool,

    http_timeout_ms: u64,
    carrier_timeout_ms: Option<u64>,
}

/// Process configuration.
///
/// A carrier is `None` when its `*_ENABLED` flag is false.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Service name reported in logs.
    pub service_name: String,
    /// Logging setup.
    pub telemetry: TelemetryConfig,
    /// Freightcom settings, when enabled.
    pub freightcom: Option<FreightcomConfig>,
    /// Canada Post settings, when enabled.
    pub canadapost: Option<CanadaPostConfig>,
    /// Purolator settings, when enabled.
    pub purolator: Option<PurolatorConfig>,
    /// Fan-out settings.
    pub registry: RegistryConfig,
}

impl GatewayConfig {
    /// Loads `.env` (if present) and then the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_vars`](Self::from_vars).
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_vars(std::env::vars())
    }

    /// Loads configuration from explicit variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] for values of the wrong type,
    /// [`ConfigError::Invalid`] for an unknown `LOG_FORMAT`, and
    /// [`ConfigError::MissingCredential`] when an enabled carrier that is not
    /// mocked lacks a credential.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let raw: RawSettings = Config::builder()
            .set_default("service_name", "delivro-logistic")?
            .set_default("log_level", "info")?
            .set_default("log_format", "json")?
            .set_default("freightcom_api_key", "")?
            .set_default("freightcom_base_url", FREIGHTCOM_BASE_URL)?
            .set_default("freightcom_enabled", true)?
            .set_default("freightcom_use_mock", false)?
            .set_default("freightcom_payment_method_id", 0)?
            .set_default("freightcom_poll_interval_ms", 500)?
            .set_default("freightcom_poll_timeout_ms", 30_000)?
            .set_default("canadapost_api_key", "")?
            .set_default("canadapost_api_secret", "")?
            .set_default("canadapost_account_id", "")?
            .set_default("canadapost_base_url", CANADAPOST_BASE_URL)?
            .set_default("canadapost_enabled", true)?
            .set_default("canadapost_use_mock", false)?
            .set_default("purolator_username", "")?
            .set_default("purolator_password", "")?
            .set_default("purolator_account_number", "")?
            .set_default("purolator_wsdl_url", PUROLATOR_BASE_URL)?
            .set_default("purolator_enabled", true)?
            .set_default("purolator_use_mock", false)?
            .set_default("http_timeout_ms", 30_000)?
            .add_source(Environment::default().source(Some(source)))
            .build()?
            .try_deserialize()?;

        raw.try_into()
    }
}

impl TryFrom<RawSettings> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let format = raw
            .log_format
            .parse::<LogFormat>()
            .map_err(|message| ConfigError::Invalid {
                variable: "LOG_FORMAT",
                message,
            })?;
        let http_timeout = Duration::from_millis(raw.http_timeout_ms);

        let freightcom = raw.freightcom_enabled.then(|| FreightcomConfig {
            api_key: raw.freightcom_api_key,
            base_url: raw.freightcom_base_url,
            payment_method_id: raw.freightcom_payment_method_id,
            use_mock: raw.freightcom_use_mock,
            poll_interval: Duration::from_millis(raw.freightcom_poll_interval_ms),
            poll_timeout: Duration::from_millis(raw.freightcom_poll_timeout_ms),
            http_timeout,
        });
        let canadapost = raw.canadapost_enabled.then(|| CanadaPostConfig {
            api_key: raw.canadapost_api_key,
            api_secret: raw.canadapost_api_secret,
            account_id: raw.canadapost_account_id,
            base_url: raw.canadapost_base_url,
            use_mock: raw.canadapost_use_mock,
            http_timeout,
        });
        let purolator = raw.purolator_enabled.then(|| PurolatorConfig {
            username: raw.purolator_username,
            password: raw.purolator_password,
            account_number: raw.purolator_account_number,
            base_url: raw.purolator_wsdl_url,
            use_mock: raw.purolator_use_mock,
            http_timeout,
        });

        let config = Self {
            service_name: raw.service_name,
            telemetry: TelemetryConfig {
                level: raw.log_level,
                format,
            },
            freightcom,
            canadapost,
            purolator,
            registry: RegistryConfig {
                per_carrier_timeout: raw.carrier_timeout_ms.map(Duration::from_millis),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl GatewayConfig {
    /// Checks that every enabled live carrier has its credentials.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::MissingCredential`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fc) = self.freightcom.as_ref().filter(|c| !c.use_mock) {
            require("freightcom", "FREIGHTCOM_API_KEY", &fc.api_key)?;
        }
        if let Some(cp) = self.canadapost.as_ref().filter(|c| !c.use_mock) {
            require("canadapost", "CANADAPOST_API_KEY", &cp.api_key)?;
            require("canadapost", "CANADAPOST_ACCOUNT_ID", &cp.account_id)?;
        }
        if let Some(puro) = self.purolator.as_ref().filter(|c| !c.use_mock) {
            require("purolator", "PUROLATOR_USERNAME", &puro.username)?;
            require("purolator", "PUROLATOR_PASSWORD", &puro.password)?;
            require("purolator", "PUROLATOR_ACCOUNT_NUMBER", &puro.account_number)?;
        }
        Ok(())
    }
}

fn require(carrier: &'static str, variable: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingCredential { carrier, variable });
    }
    Ok(())
}
