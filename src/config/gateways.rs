//! Payment gateway configuration (Paystack, Flutterwave)

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the payment gateways the registry can hold.
///
/// Each gateway is optional: an unset section means that provider is not
/// configured and verifications against it fail closed at runtime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaysConfig {
    /// Paystack credentials
    #[serde(default)]
    pub paystack: GatewaySection,

    /// Flutterwave credentials
    #[serde(default)]
    pub flutterwave: GatewaySection,
}

/// Credentials for a single gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySection {
    /// Secret API key. Empty means the gateway is disabled.
    #[serde(default)]
    pub secret_key: String,

    /// Override for the API base URL (testing against a stub server)
    pub api_base_url: Option<String>,
}

impl GatewaySection {
    /// Whether this gateway has credentials and should be registered.
    pub fn is_enabled(&self) -> bool {
        !self.secret_key.is_empty()
    }
}

impl GatewaysConfig {
    /// Validate gateway configuration
    ///
    /// Key prefixes are checked so a key swapped between providers is
    /// caught at startup rather than on the first verification.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.paystack.is_enabled() && !self.flutterwave.is_enabled() {
            return Err(ValidationError::MissingRequired("GATEWAYS__PAYSTACK__SECRET_KEY"));
        }
        if self.paystack.is_enabled() && !self.paystack.secret_key.starts_with("sk_") {
            return Err(ValidationError::InvalidPaystackKey);
        }
        if self.flutterwave.is_enabled() && !self.flutterwave.secret_key.starts_with("FLWSECK") {
            return Err(ValidationError::InvalidFlutterwaveKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(key: &str) -> GatewaySection {
        GatewaySection {
            secret_key: key.to_string(),
            api_base_url: None,
        }
    }

    #[test]
    fn test_no_gateway_configured_is_rejected() {
        let config = GatewaysConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_gateway_is_enough() {
        let config = GatewaysConfig {
            paystack: enabled("sk_test_abc"),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.flutterwave.is_enabled());
    }

    #[test]
    fn test_paystack_key_prefix_checked() {
        let config = GatewaysConfig {
            paystack: enabled("FLWSECK-oops"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPaystackKey)
        ));
    }

    #[test]
    fn test_flutterwave_key_prefix_checked() {
        let config = GatewaysConfig {
            flutterwave: enabled("sk_test_oops"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidFlutterwaveKey)
        ));
    }

    #[test]
    fn test_both_gateways_valid() {
        let config = GatewaysConfig {
            paystack: enabled("sk_live_abc"),
            flutterwave: enabled("FLWSECK-xyz"),
        };
        assert!(config.validate().is_ok());
    }
}
