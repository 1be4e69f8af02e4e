//! SSO error types.

use thiserror::Error;

pub type SsoResult<T> = Result<T, SsoError>;

/// Every way a login round-trip or refresh can fail.
///
/// None of these are recovered from inside the crate; each one is handed
/// back to the caller as-is.
#[derive(Debug, Error)]
pub enum SsoError {
    /// The redirect URL was malformed or lacked `code`/`state`.
    #[error("Callback parsing failed: {0}")]
    CallbackParsingError(String),

    /// The state echoed back by the provider differs from the saved one.
    #[error("Submitted and received state don't match")]
    StateMismatchError,

    /// The HTTP call to the token endpoint produced no response.
    #[error("HTTP request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The token endpoint answered with a structured error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Signature, key resolution or token structure could not be verified.
    #[error("Token verification failed: {0}")]
    TokenVerificationError(String),

    /// Signature was valid but the issuer is not one we accept.
    #[error("JWT returned an invalid iss: {}", .0.as_deref().unwrap_or("<missing>"))]
    InvalidIssuerError(Option<String>),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for SsoError {
    fn from(err: config::ConfigError) -> Self {
        SsoError::ConfigError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SsoError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SsoError::TokenVerificationError(err.to_string())
    }
}
