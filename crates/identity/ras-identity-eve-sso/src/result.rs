//! Normalized results handed back to callers.
//!
//! A field is `None` exactly when the provider did not send it; nothing is
//! defaulted. The untouched provider payloads stay available under `raw`.

use crate::types::TokenResponse;
use crate::verify::VerifiedToken;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackRaw {
    /// Token endpoint body
    pub token: serde_json::Value,
    /// Decoded access token claims
    pub jwt: serde_json::Value,
}

/// Outcome of a completed login round-trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResult {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scopes: Option<Vec<String>>,
    pub owner: Option<String>,
    pub character_name: Option<String>,
    #[serde(rename = "characterID")]
    pub character_id: Option<String>,
    pub raw: CallbackRaw,
}

impl CallbackResult {
    pub fn assemble(token: TokenResponse, verified: VerifiedToken, subject_prefix: &str) -> Self {
        let character_id = verified.claims.character_id(subject_prefix);
        let claims = verified.claims;

        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            scopes: claims.scopes,
            owner: claims.owner,
            character_name: claims.character_name,
            character_id,
            raw: CallbackRaw {
                token: token.raw,
                jwt: verified.raw,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRaw {
    pub token: serde_json::Value,
}

/// Outcome of a refresh-token grant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub raw: RefreshRaw,
}

impl RefreshResult {
    pub fn assemble(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            raw: RefreshRaw { token: token.raw },
        }
    }
}
