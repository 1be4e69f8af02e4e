//! Access token verification: key lookup by `kid`, signature, issuer.

use crate::error::{SsoError, SsoResult};
use crate::jwks::SigningKeyProvider;
use crate::types::IdentityClaims;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use std::sync::Arc;
use tracing::{debug, warn};

/// Claims of a token whose signature and issuer have been checked.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub claims: IdentityClaims,
    /// The full claim set as decoded
    pub raw: serde_json::Value,
}

#[derive(Clone)]
pub struct TokenVerifier {
    key_provider: Arc<dyn SigningKeyProvider>,
    accepted_issuers: Vec<String>,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    pub fn new(key_provider: Arc<dyn SigningKeyProvider>, accepted_issuers: Vec<String>) -> Self {
        Self {
            key_provider,
            accepted_issuers,
            algorithms: vec![Algorithm::RS256],
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Verify `token` and return its claims.
    ///
    /// A valid signature is not enough: the issuer must also be on the
    /// allow-list, otherwise [`SsoError::InvalidIssuerError`] is returned.
    pub async fn verify(&self, token: &str) -> SsoResult<VerifiedToken> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or_else(|| {
            SsoError::TokenVerificationError("Token header has no key id".to_string())
        })?;

        let key = self.key_provider.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = self.algorithms.clone();
        validation.validate_aud = false;

        let raw = decode::<serde_json::Value>(token, &key, &validation)?.claims;
        let claims: IdentityClaims = serde_json::from_value(raw.clone())
            .map_err(|e| SsoError::TokenVerificationError(format!("Unexpected claims: {}", e)))?;

        let issuer_accepted = claims
            .issuer
            .as_ref()
            .is_some_and(|iss| self.accepted_issuers.iter().any(|accepted| accepted == iss));

        if !issuer_accepted {
            warn!("Rejecting token from issuer {:?}", claims.issuer);
            return Err(SsoError::InvalidIssuerError(claims.issuer));
        }

        debug!("Verified token signed with key {}", kid);
        Ok(VerifiedToken { claims, raw })
    }
}
