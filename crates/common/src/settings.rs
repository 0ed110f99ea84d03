use std::str;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use validator::Validate;

use crate::error::AssertionBrokerError;
use crate::identity::SignatureAlgorithm;

/// Configuration for assertion signing and key publication.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SigningSettings {
    /// Signature algorithm used for assertions and advertised in the key set.
    pub algorithm: SignatureAlgorithm,
    /// Assertion lifetime in seconds.
    #[validate(range(min = 1, max = 31_536_000))]
    pub assertion_ttl: u64,
    /// Issuer (`iss`) claim stamped on every assertion.
    #[validate(length(min = 1))]
    pub issuer: String,
    /// Audience (`aud`) claim identifying the relying system.
    #[validate(length(min = 1))]
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub signing: SigningSettings,
}

impl Settings {
    /// Loads the embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the embedded TOML or an
    /// environment override is missing a required key or malformed.
    pub fn new() -> Result<Self, Report<AssertionBrokerError>> {
        let toml_bytes = include_bytes!("../../../assertion-broker.toml");
        let toml_str = str::from_utf8(toml_bytes).change_context(
            AssertionBrokerError::Configuration {
                message: "Embedded configuration is not valid UTF-8".into(),
            },
        )?;

        Self::from_toml(toml_str)
    }

    /// Parses settings from a TOML string and applies `ASSERTION_BROKER__*`
    /// environment overrides.
    ///
    /// Validation happens here, once, so a missing or malformed
    /// `signing.algorithm` or `signing.assertion_ttl` is reported before any
    /// signer or key-set publisher can be constructed.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for unparseable TOML, missing
    /// required keys or values failing validation.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<AssertionBrokerError>> {
        let environment = Environment::default()
            .prefix("ASSERTION_BROKER")
            .separator("__");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(AssertionBrokerError::Configuration {
                message: "Failed to read configuration".into(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(AssertionBrokerError::Configuration {
                    message: "Failed to deserialize configuration".into(),
                })?;

        settings
            .validate()
            .change_context(AssertionBrokerError::Configuration {
                message: "Settings validation failed".into(),
            })?;

        log::debug!(
            "Signing configuration loaded: algorithm={}, ttl={}s",
            settings.signing.algorithm,
            settings.signing.assertion_ttl
        );

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_new() {
        let settings = Settings::new();
        assert!(settings.is_ok(), "Settings should load from embedded TOML");

        let settings = settings.unwrap();
        assert_eq!(settings.signing.algorithm, SignatureAlgorithm::Rs256);
        assert!(settings.signing.assertion_ttl > 0);
        assert!(!settings.signing.issuer.is_empty());
        assert!(!settings.signing.audience.is_empty());
    }

    #[test]
    fn test_settings_from_valid_toml() {
        let toml_str = r#"
            [signing]
            algorithm = "RS512"
            assertion_ttl = 120
            issuer = "https://broker.test"
            audience = "https://relying-party.test"
            "#;

        let settings = Settings::from_toml(toml_str).expect("should parse settings");
        assert_eq!(settings.signing.algorithm, SignatureAlgorithm::Rs512);
        assert_eq!(settings.signing.assertion_ttl, 120);
        assert_eq!(settings.signing.issuer, "https://broker.test");
        assert_eq!(settings.signing.audience, "https://relying-party.test");
    }

    #[test]
    fn test_settings_missing_ttl() {
        let toml_str = r#"
            [signing]
            algorithm = "RS256"
            issuer = "https://broker.test"
            audience = "https://relying-party.test"
            "#;

        let result = Settings::from_toml(toml_str);
        assert!(result.is_err(), "Should fail when assertion_ttl is missing");
    }

    #[test]
    fn test_settings_unsupported_algorithm() {
        let toml_str = r#"
            [signing]
            algorithm = "HS256"
            assertion_ttl = 300
            issuer = "https://broker.test"
            audience = "https://relying-party.test"
            "#;

        let result = Settings::from_toml(toml_str);
        assert!(result.is_err(), "Should fail for a non-RSA algorithm name");
    }

    #[test]
    fn test_settings_zero_ttl_fails_validation() {
        let toml_str = r#"
            [signing]
            algorithm = "RS256"
            assertion_ttl = 0
            issuer = "https://broker.test"
            audience = "https://relying-party.test"
            "#;

        let result = Settings::from_toml(toml_str);
        assert!(result.is_err(), "Should fail validation for a zero TTL");
    }

    #[test]
    fn test_settings_empty_toml() {
        let settings = Settings::from_toml("");
        assert!(settings.is_err(), "Should fail with empty TOML");
    }

    #[test]
    fn test_settings_invalid_toml_syntax() {
        let toml_str = r#"
            [signing
            algorithm = "RS256"
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(settings.is_err(), "Should fail with invalid TOML syntax");
    }

    #[test]
    fn test_ttl_env_override() {
        let toml_str = r#"
            [signing]
            algorithm = "RS256"
            assertion_ttl = 300
            issuer = "https://broker.test"
            audience = "https://relying-party.test"
            "#;

        temp_env::with_var(
            "ASSERTION_BROKER__SIGNING__ASSERTION_TTL",
            Some("600"),
            || {
                let settings = Settings::from_toml(toml_str).expect("should parse settings");
                assert_eq!(settings.signing.assertion_ttl, 600);
            },
        );
    }
}
