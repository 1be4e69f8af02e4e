//! EVE Online SSO client.
//!
//! Implements the OAuth2 Authorization Code flow with PKCE against the EVE
//! SSO and verifies the returned access token (a JWT signed with a key
//! published in the SSO's key set).
//!
//! The flow is split in two calls: [`SsoProvider::get_login`] builds the
//! login URL together with the `state` and PKCE verifier the caller must keep,
//! and [`SsoProvider::handle_callback`] validates the redirect, exchanges the
//! code and verifies the token. [`SsoProvider::refresh`] trades a refresh
//! token for a new access token.

mod config;
mod error;
mod jwks;
mod pkce;
mod provider;
mod query;
mod result;
mod token;
mod types;
mod verify;

#[cfg(test)]
mod test_support;

pub use config::{
    DEFAULT_ACCEPTED_ISSUERS, DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_JWKS_ENDPOINT,
    DEFAULT_SUBJECT_PREFIX, DEFAULT_TOKEN_ENDPOINT, DEFAULT_TOKEN_HOST, SsoConfig,
};
pub use error::{SsoError, SsoResult};
pub use jwks::{JwksClient, SigningKeyProvider};
pub use pkce::{CODE_CHALLENGE_METHOD, PkceChallenge, generate_state};
pub use provider::SsoProvider;
pub use query::{AuthorizationRequest, ProviderQuery};
pub use result::{CallbackRaw, CallbackResult, RefreshRaw, RefreshResult};
pub use token::TokenClient;
pub use types::{CallbackParams, IdentityClaims, LoginRequest, TokenResponse};
pub use verify::{TokenVerifier, VerifiedToken};

// Re-exported so custom key providers can build keys
pub use jsonwebtoken::{Algorithm, DecodingKey};
