//! EVE SSO provider: login initiation, callback handling and refresh.

use crate::config::SsoConfig;
use crate::error::{SsoError, SsoResult};
use crate::jwks::{JwksClient, SigningKeyProvider};
use crate::pkce::{PkceChallenge, generate_state};
use crate::query::AuthorizationRequest;
use crate::result::{CallbackResult, RefreshResult};
use crate::token::TokenClient;
use crate::types::{CallbackParams, LoginRequest};
use crate::verify::TokenVerifier;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client side of the SSO authorization code flow with PKCE.
///
/// The provider keeps no per-login state. Whatever [`get_login`] returns
/// has to be stored by the caller until the redirect comes back.
///
/// [`get_login`]: SsoProvider::get_login
#[derive(Clone)]
pub struct SsoProvider {
    config: SsoConfig,
    token_client: TokenClient,
    verifier: TokenVerifier,
}

impl SsoProvider {
    /// Create a provider that resolves signing keys from `config.jwks_endpoint`.
    pub fn new(config: SsoConfig) -> SsoResult<Self> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        let key_provider = Arc::new(JwksClient::new(
            http_client.clone(),
            config.jwks_endpoint.clone(),
        ));

        Ok(Self::from_parts(config, http_client, key_provider))
    }

    /// Create a provider with its own signing key source.
    pub fn with_key_provider(
        config: SsoConfig,
        key_provider: Arc<dyn SigningKeyProvider>,
    ) -> SsoResult<Self> {
        config.validate()?;
        let http_client = build_http_client(&config)?;

        Ok(Self::from_parts(config, http_client, key_provider))
    }

    fn from_parts(
        config: SsoConfig,
        http_client: Client,
        key_provider: Arc<dyn SigningKeyProvider>,
    ) -> Self {
        let token_client = TokenClient::new(
            http_client,
            config.token_endpoint.clone(),
            config.token_host.clone(),
            config.client_id.clone(),
        );
        let verifier = TokenVerifier::new(key_provider, config.accepted_issuers.clone());

        Self {
            config,
            token_client,
            verifier,
        }
    }

    pub fn config(&self) -> &SsoConfig {
        &self.config
    }

    /// Start a login: builds the authorization URL with a fresh state and
    /// PKCE challenge.
    ///
    /// `callback_url` must match the one registered for the application.
    pub fn get_login<S: AsRef<str>>(&self, callback_url: &str, scopes: &[S]) -> LoginRequest {
        let pkce = PkceChallenge::new();
        let state = generate_state();
        let scopes: Vec<String> = scopes.iter().map(|s| s.as_ref().to_string()).collect();

        let url = AuthorizationRequest {
            callback_url,
            scopes: &scopes,
            state: &state,
            code_challenge: &pkce.code_challenge,
        }
        .to_url(&self.config.authorization_endpoint, &self.config.client_id);

        debug!("Generated login URL with {} scopes", scopes.len());

        LoginRequest {
            url,
            state,
            code_verifier: pkce.code_verifier,
        }
    }

    /// Finish a login from the URL the provider redirected to.
    ///
    /// `saved_state` and `saved_code_verifier` are the values returned by
    /// [`get_login`](SsoProvider::get_login). Parameter extraction and the
    /// state comparison happen before any network call.
    ///
    /// Authorization codes are single-use. If this fails after the code was
    /// sent to the token endpoint, retrying with the same redirect URL will
    /// not work; start over with a new login.
    pub async fn handle_callback(
        &self,
        redirect_url: &str,
        saved_state: &str,
        saved_code_verifier: &str,
    ) -> SsoResult<CallbackResult> {
        let params = CallbackParams::from_redirect_url(redirect_url)?;

        if params.state != saved_state {
            warn!("Callback state does not match the saved state");
            return Err(SsoError::StateMismatchError);
        }

        let token = self
            .token_client
            .exchange_code(&params.code, saved_code_verifier)
            .await?;

        let access_token = token.access_token.as_deref().ok_or_else(|| {
            SsoError::InvalidTokenResponse("Token response has no access_token".to_string())
        })?;

        let verified = self.verifier.verify(access_token).await?;
        let result = CallbackResult::assemble(token, verified, &self.config.subject_prefix);

        info!(
            "Completed SSO login for character {}",
            result.character_id.as_deref().unwrap_or("<unknown>")
        );

        Ok(result)
    }

    /// Get a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> SsoResult<RefreshResult> {
        let token = self.token_client.refresh(refresh_token).await?;
        Ok(RefreshResult::assemble(token))
    }
}

fn build_http_client(config: &SsoConfig) -> SsoResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()?;
    Ok(client)
}
