//! Signing key resolution from the provider's JSON Web Key Set.

use crate::error::{SsoError, SsoResult};
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::Jwk;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Resolves the public key a token was signed with, by key id.
#[async_trait]
pub trait SigningKeyProvider: Send + Sync {
    async fn signing_key(&self, kid: &str) -> SsoResult<DecodingKey>;
}

/// Raw key set. Keys are parsed one by one so an entry we cannot use
/// does not hide the others.
#[derive(Debug, Deserialize)]
struct JwksDocument {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// Read-through, in-process cache in front of the key set endpoint.
///
/// A key id that is not cached triggers a fetch of the whole set. Two
/// concurrent misses may both fetch; the last one to finish wins.
#[derive(Clone)]
pub struct JwksClient {
    http_client: Client,
    jwks_uri: String,
    keys: Arc<RwLock<HashMap<String, DecodingKey>>>,
}

impl JwksClient {
    pub fn new(http_client: Client, jwks_uri: impl Into<String>) -> Self {
        Self {
            http_client,
            jwks_uri: jwks_uri.into(),
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn cached_key_ids(&self) -> Vec<String> {
        let keys = self.keys.read().await;
        keys.keys().cloned().collect()
    }

    async fn fetch_keys(&self) -> SsoResult<HashMap<String, DecodingKey>> {
        let document: JwksDocument = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SsoError::TokenVerificationError(format!("Failed to fetch JWKS: {}", e)))?
            .json()
            .await
            .map_err(|e| SsoError::TokenVerificationError(format!("Failed to parse JWKS: {}", e)))?;

        let mut keys = HashMap::new();
        for value in document.keys {
            let jwk: Jwk = match serde_json::from_value(value) {
                Ok(jwk) => jwk,
                Err(e) => {
                    warn!("Skipping unreadable JWK: {}", e);
                    continue;
                }
            };

            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("Skipping JWK without key id");
                continue;
            };

            match DecodingKey::from_jwk(&jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => warn!("Skipping unusable JWK {}: {}", kid, e),
            }
        }

        info!("Fetched {} signing keys from {}", keys.len(), self.jwks_uri);
        Ok(keys)
    }
}

#[async_trait]
impl SigningKeyProvider for JwksClient {
    async fn signing_key(&self, kid: &str) -> SsoResult<DecodingKey> {
        {
            let keys = self.keys.read().await;
            if let Some(key) = keys.get(kid) {
                debug!("Signing key {} served from cache", kid);
                return Ok(key.clone());
            }
        }

        debug!("Signing key {} not cached, fetching key set", kid);
        let fetched = self.fetch_keys().await?;
        let key = fetched.get(kid).cloned();

        {
            let mut keys = self.keys.write().await;
            keys.extend(fetched);
        }

        key.ok_or_else(|| {
            SsoError::TokenVerificationError(format!("No signing key found for kid {}", kid))
        })
    }
}
