//! Fixtures shared by the unit and flow tests.

use crate::error::{SsoError, SsoResult};
use crate::jwks::SigningKeyProvider;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use serde_json::json;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa-private.pem");
pub const OTHER_RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa-other-private.pem");
pub const JWKS_JSON: &str = include_str!("../fixtures/jwks.json");
pub const TEST_KID: &str = "JWT-Signature-Key";

/// Keys known up front, no network.
pub struct StaticKeys(HashMap<String, DecodingKey>);

impl StaticKeys {
    pub fn fixture() -> Self {
        let set: JwkSet = serde_json::from_str(JWKS_JSON).unwrap();
        let keys = set
            .keys
            .iter()
            .map(|jwk| {
                (
                    jwk.common.key_id.clone().unwrap(),
                    DecodingKey::from_jwk(jwk).unwrap(),
                )
            })
            .collect();
        Self(keys)
    }
}

#[async_trait]
impl SigningKeyProvider for StaticKeys {
    async fn signing_key(&self, kid: &str) -> SsoResult<DecodingKey> {
        self.0
            .get(kid)
            .cloned()
            .ok_or_else(|| SsoError::TokenVerificationError(format!("unknown kid {}", kid)))
    }
}

/// Claims shaped like a real SSO access token, valid for the next 20 minutes.
pub fn eve_claims(issuer: &str) -> serde_json::Value {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    json!({
        "scp": ["esi-skills.read_skills.v1", "esi-wallet.read_character_wallet.v1"],
        "jti": "998e12c7-3241-43c5-8355-2c48822e0a1b",
        "kid": TEST_KID,
        "sub": "CHARACTER:EVE:123456",
        "azp": "my3rdpartyclientid",
        "tenant": "tranquility",
        "tier": "live",
        "region": "world",
        "aud": ["my3rdpartyclientid", "EVE Online"],
        "name": "Some Pilot",
        "owner": "8PmzCeTKb4VFUDrHLc/AeZXDSWM=",
        "exp": now + 1200,
        "iat": now,
        "iss": issuer
    })
}

pub fn sign_token(claims: &serde_json::Value, private_pem: &str, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}
