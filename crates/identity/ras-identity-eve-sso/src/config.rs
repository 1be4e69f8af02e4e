//! SSO configuration types.

use crate::error::{SsoError, SsoResult};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://login.eveonline.com/v2/oauth/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://login.eveonline.com/v2/oauth/token";
pub const DEFAULT_JWKS_ENDPOINT: &str = "https://login.eveonline.com/oauth/jwks";
pub const DEFAULT_TOKEN_HOST: &str = "login.eveonline.com";
pub const DEFAULT_SUBJECT_PREFIX: &str = "CHARACTER:EVE:";

/// Issuers the provider has been seen to emit, bare host and URL form.
pub const DEFAULT_ACCEPTED_ISSUERS: [&str; 2] =
    ["login.eveonline.com", "https://login.eveonline.com"];

const ENV_PREFIX: &str = "EVE_SSO";

/// Static configuration for a single SSO application.
///
/// Every endpoint defaults to the EVE Online SSO; override them to run
/// against a substitute provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoConfig {
    /// Client id registered on developers.eveonline.com
    pub client_id: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_endpoint: String,
    /// Value sent in the `Host` header of token requests
    pub token_host: String,
    /// Allow-list for the `iss` claim of verified tokens
    pub accepted_issuers: Vec<String>,
    /// Namespace stripped from the `sub` claim to get the character id
    pub subject_prefix: String,
    pub http_timeout_seconds: u64,
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authorization_endpoint: DEFAULT_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            jwks_endpoint: DEFAULT_JWKS_ENDPOINT.to_string(),
            token_host: DEFAULT_TOKEN_HOST.to_string(),
            accepted_issuers: DEFAULT_ACCEPTED_ISSUERS
                .iter()
                .map(|iss| iss.to_string())
                .collect(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl SsoConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Load configuration from an optional TOML file, then `EVE_SSO_*`
    /// environment variables. Environment values take precedence.
    ///
    /// `EVE_SSO_ACCEPTED_ISSUERS` is a comma separated list.
    pub fn load(path: Option<&Path>) -> SsoResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = path {
            debug!("Loading SSO configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("accepted_issuers"),
        );

        let config: SsoConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SsoResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(SsoError::ConfigError("client_id must not be empty".to_string()));
        }

        for (name, endpoint) in [
            ("authorization_endpoint", &self.authorization_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("jwks_endpoint", &self.jwks_endpoint),
        ] {
            Url::parse(endpoint)
                .map_err(|e| SsoError::ConfigError(format!("{name} is not a valid URL: {e}")))?;
        }

        if self.accepted_issuers.is_empty() {
            return Err(SsoError::ConfigError(
                "accepted_issuers must contain at least one issuer".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = endpoint.into();
        self
    }

    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    pub fn with_jwks_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.jwks_endpoint = endpoint.into();
        self
    }

    pub fn with_token_host(mut self, host: impl Into<String>) -> Self {
        self.token_host = host.into();
        self
    }

    pub fn with_accepted_issuers<I, S>(mut self, issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_issuers = issuers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_eve_sso() {
        let config = SsoConfig::new("my-client");

        assert_eq!(config.client_id, "my-client");
        assert_eq!(config.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(config.token_host, "login.eveonline.com");
        assert_eq!(
            config.accepted_issuers,
            vec!["login.eveonline.com", "https://login.eveonline.com"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_client = SsoConfig::default();
        assert!(matches!(empty_client.validate(), Err(SsoError::ConfigError(_))));

        let bad_endpoint = SsoConfig::new("client").with_token_endpoint("not a url");
        assert!(matches!(bad_endpoint.validate(), Err(SsoError::ConfigError(_))));

        let no_issuers = SsoConfig::new("client").with_accepted_issuers(Vec::<String>::new());
        assert!(matches!(no_issuers.validate(), Err(SsoError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
client_id = "file-client"
token_endpoint = "http://127.0.0.1:9000/token"
accepted_issuers = ["issuer.test"]
http_timeout_seconds = 5
"#
        )
        .unwrap();

        let config = SsoConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.client_id, "file-client");
        assert_eq!(config.token_endpoint, "http://127.0.0.1:9000/token");
        assert_eq!(config.accepted_issuers, vec!["issuer.test"]);
        assert_eq!(config.http_timeout_seconds, 5);
        // Untouched keys keep their defaults
        assert_eq!(config.jwks_endpoint, DEFAULT_JWKS_ENDPOINT);
        assert_eq!(config.subject_prefix, DEFAULT_SUBJECT_PREFIX);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = SsoConfig::load(Some(Path::new("/nonexistent/eve-sso.toml")));
        assert!(matches!(result, Err(SsoError::ConfigError(_))));
    }
}
