//! JSON Web Key Set publication.
//!
//! Derives the broker's public verification key from the signing identity
//! and serves it in the conventional JWKS document shape relying parties
//! fetch and cache.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};

use crate::identity::SigningIdentity;

/// A published JSON Web Key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type; always "RSA" for this broker.
    pub kty: String,
    /// Stable key identifier relying parties select by.
    pub kid: String,
    /// RSA modulus, big-endian, base64url without padding.
    pub n: String,
    /// RSA public exponent, big-endian, base64url without padding.
    pub e: String,
    /// Signature algorithm the key is used with.
    pub alg: String,
    /// Key use; always "sig".
    #[serde(rename = "use")]
    pub key_use: String,
}

/// A key-set document.
///
/// A single key today, but the shape carries a sequence so further keys can
/// be published without changing consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

/// Publishes the verification key set for the broker's signing identity.
///
/// The document is a pure function of the identity, so it is derived once at
/// construction and reused for every request. Publishing a rotated identity
/// means constructing a new publisher from it.
pub struct KeySetPublisher {
    key_set: JsonWebKeySet,
}

impl KeySetPublisher {
    #[must_use]
    pub fn new(identity: &SigningIdentity) -> Self {
        Self {
            key_set: JsonWebKeySet {
                keys: vec![public_jwk(identity)],
            },
        }
    }

    /// The published key set; byte-stable across calls.
    #[must_use]
    pub fn key_set(&self) -> &JsonWebKeySet {
        &self.key_set
    }
}

fn public_jwk(identity: &SigningIdentity) -> JsonWebKey {
    let public_key = identity.public_key();

    // Minimal big-endian encodings; no sign byte, no padding.
    JsonWebKey {
        kty: "RSA".to_string(),
        kid: identity.key_id().to_owned(),
        n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        alg: identity.algorithm().name().to_string(),
        key_use: "sig".to_string(),
    }
}
