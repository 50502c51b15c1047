//! # Bootstrap
//!
//! Builds a [`CarrierRegistry`] from [`GatewayConfig`].

use crate::application::services::registry::CarrierRegistry;
use crate::config::{ConfigError, GatewayConfig};
use crate::infrastructure::carriers::{CanadaPostCarrier, FreightcomCarrier, PurolatorCarrier};
use std::sync::Arc;

/// Registers every enabled carrier, binding its mock or live transport per
/// its `use_mock` flag.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredential`] when a live carrier lacks
/// credentials and [`ConfigError::Carrier`] when an adapter cannot be built.
pub fn build_registry(config: &GatewayConfig) -> Result<CarrierRegistry, ConfigError> {
    config.validate()?;
    let registry = CarrierRegistry::with_config(config.registry);

    if let Some(settings) = &config.freightcom {
        registry.register(Arc::new(FreightcomCarrier::new(settings.clone())?));
    }
    if let Some(settings) = &config.canadapost {
        registry.register(Arc::new(CanadaPostCarrier::new(settings.clone())?));
    }
    if let Some(settings) = &config.purolator {
        registry.register(Arc::new(PurolatorCarrier::new(settings.clone())?));
    }

    tracing::info!(
        service = %config.service_name,
        carriers = ?registry.names(),
        "Carrier registry ready"
    );
    Ok(registry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ids::{CANADAPOST, FREIGHTCOM, PUROLATOR};

    #[test]
    fn registers_enabled_carriers() {
        let config = GatewayConfig::from_vars([
            ("FREIGHTCOM_USE_MOCK", "true"),
            ("CANADAPOST_ENABLED", "false"),
            ("PUROLATOR_USERNAME", "user"),
            ("PUROLATOR_PASSWORD", "pass"),
            ("PUROLATOR_ACCOUNT_NUMBER", "9999999999"),
        ])
        .unwrap();
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.names(), [FREIGHTCOM, PUROLATOR]);
        assert!(registry.get(CANADAPOST).is_err());
    }

    #[test]
    fn hand_built_config_is_validated() {
        let mut config = GatewayConfig::from_vars([
            ("FREIGHTCOM_USE_MOCK", "true"),
            ("CANADAPOST_USE_MOCK", "true"),
            ("PUROLATOR_USE_MOCK", "true"),
        ])
        .unwrap();
        if let Some(fc) = config.freightcom.as_mut() {
            fc.use_mock = false;
        }
        assert!(matches!(
            build_registry(&config).unwrap_err(),
            ConfigError::MissingCredential {
                carrier: "freightcom",
                ..
            }
        ));
    }
}
