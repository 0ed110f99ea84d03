//! Signed identity assertions.
//!
//! Builds the claim set for a federated-login assertion and produces the
//! compact RSA-signed token relying parties verify against the published
//! key set.

use std::sync::Arc;

use chrono::Utc;
use error_stack::{Report, ResultExt};
use jsonwebtoken::Header;
use serde::{Deserialize, Serialize};

use crate::error::AssertionBrokerError;
use crate::identity::SigningIdentity;
use crate::settings::SigningSettings;

/// Claim set carried by a signed assertion.
///
/// Built fresh for every request and dropped once the compact token has
/// been produced. All timestamps are UNIX epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer: this broker.
    pub iss: String,
    /// Audience: the relying system the assertion is minted for.
    pub aud: String,
    /// Subject being vouched for.
    pub sub: String,
    /// Partner context the subject belongs to.
    pub bank: String,
    /// Issued-at.
    pub iat: i64,
    /// Not-before, always equal to `iat`.
    pub nbf: i64,
    /// Expiration: `iat` plus the configured lifetime.
    pub exp: i64,
}

/// Issues compact signed assertions on behalf of the broker.
///
/// Stateless between calls; every assertion is an independent computation
/// over the signing identity, the inputs and the clock.
pub struct AssertionSigner {
    identity: Arc<SigningIdentity>,
    issuer: String,
    audience: String,
    ttl_secs: i64,
}

impl AssertionSigner {
    #[must_use]
    pub fn new(identity: Arc<SigningIdentity>, signing: &SigningSettings) -> Self {
        Self {
            identity,
            issuer: signing.issuer.clone(),
            audience: signing.audience.clone(),
            ttl_secs: signing.assertion_ttl as i64,
        }
    }

    /// Creates a signed assertion vouching for `subject` within the partner
    /// context `bank`.
    ///
    /// Both inputs are opaque here; callers guarantee they are non-empty.
    /// The token is deterministic for identical inputs and clock reading,
    /// and two calls at different instants produce different tokens.
    ///
    /// # Errors
    ///
    /// Returns a `Signing` error if the private key rejects the signing
    /// operation.
    pub fn create_signed_assertion(
        &self,
        subject: &str,
        bank: &str,
    ) -> Result<String, Report<AssertionBrokerError>> {
        self.signed_assertion_at(Utc::now().timestamp(), subject, bank)
    }

    fn signed_assertion_at(
        &self,
        issued_at: i64,
        subject: &str,
        bank: &str,
    ) -> Result<String, Report<AssertionBrokerError>> {
        let claims = AssertionClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: subject.to_owned(),
            bank: bank.to_owned(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + self.ttl_secs,
        };

        let mut header = Header::new(self.identity.algorithm().jwt_algorithm());
        header.kid = Some(self.identity.key_id().to_owned());

        log::debug!("Issuing signed assertion for partner context {bank}");

        jsonwebtoken::encode(&header, &claims, self.identity.encoding_key()).change_context(
            AssertionBrokerError::Signing {
                message: "Failed to sign assertion".into(),
            },
        )
    }
}
