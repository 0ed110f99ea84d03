//! Process-lifetime RSA signing identity.
//!
//! The key pair and key identifier are materialized outside this crate and
//! injected at startup; this module parses and holds them and exposes the
//! halves the signer and the key-set publisher need. Keys are never
//! generated, stored or rotated here.

use std::fmt;

use error_stack::Report;
use jsonwebtoken::EncodingKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{de, Deserialize, Deserializer};

use crate::error::AssertionBrokerError;

/// Minimum RSA modulus size usable with the RS* signature schemes.
const MIN_RSA_BITS: usize = 2048;

/// RSA signature schemes supported for assertion signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Rs256,
    Rs384,
    Rs512,
}

impl SignatureAlgorithm {
    /// Resolves a configured algorithm name.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for any name outside the supported
    /// RSA set.
    pub fn from_name(name: &str) -> Result<Self, Report<AssertionBrokerError>> {
        match name {
            "RS256" => Ok(Self::Rs256),
            "RS384" => Ok(Self::Rs384),
            "RS512" => Ok(Self::Rs512),
            other => Err(Report::new(AssertionBrokerError::Configuration {
                message: format!("Unsupported signature algorithm: {other}"),
            })),
        }
    }

    /// The JWA name advertised in assertion headers and the key set.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
        }
    }

    pub(crate) fn jwt_algorithm(self) -> jsonwebtoken::Algorithm {
        match self {
            Self::Rs256 => jsonwebtoken::Algorithm::RS256,
            Self::Rs384 => jsonwebtoken::Algorithm::RS384,
            Self::Rs512 => jsonwebtoken::Algorithm::RS512,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SignatureAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .map_err(|_| de::Error::custom(format!("unsupported signature algorithm: {name}")))
    }
}

/// The broker's signing credential: RSA key pair, stable key identifier and
/// configured signature algorithm.
///
/// Immutable for the process lifetime. The public half is always derived
/// from the supplied private key, so the pair is matched by construction.
pub struct SigningIdentity {
    encoding_key: EncodingKey,
    public_key: RsaPublicKey,
    key_id: String,
    algorithm: SignatureAlgorithm,
}

impl fmt::Debug for SigningIdentity {
    // Key material stays out of debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningIdentity {
    /// Builds an identity from an already-materialized private key.
    ///
    /// # Errors
    ///
    /// Returns a `Signing` error if the key is too small for the RS*
    /// algorithms or cannot be re-encoded for the signer.
    pub fn new(
        private_key: RsaPrivateKey,
        key_id: impl Into<String>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, Report<AssertionBrokerError>> {
        let bits = private_key.size() * 8;
        if bits < MIN_RSA_BITS {
            return Err(Report::new(AssertionBrokerError::Signing {
                message: format!(
                    "{bits}-bit RSA key is incompatible with {algorithm} (minimum {MIN_RSA_BITS} bits)"
                ),
            }));
        }

        let der = private_key.to_pkcs1_der().map_err(|e| {
            Report::new(AssertionBrokerError::Signing {
                message: format!("Failed to encode private key for signing: {e}"),
            })
        })?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());
        let public_key = private_key.to_public_key();

        Ok(Self {
            encoding_key,
            public_key,
            key_id: key_id.into(),
            algorithm,
        })
    }

    /// Parses a PEM-encoded private key, accepting PKCS#8 with a PKCS#1
    /// fallback.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the PEM cannot be parsed as either
    /// form, or a `Signing` error if the key is unusable with the configured
    /// algorithm.
    pub fn from_pem(
        pem: &str,
        key_id: impl Into<String>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, Report<AssertionBrokerError>> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| {
                Report::new(AssertionBrokerError::Configuration {
                    message: format!("Failed to parse RSA private key PEM: {e}"),
                })
            })?;
        Self::new(private_key, key_id, algorithm)
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }
}
