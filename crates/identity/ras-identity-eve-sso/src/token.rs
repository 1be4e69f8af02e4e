//! Token endpoint client for the authorization-code and refresh grants.

use crate::error::{SsoError, SsoResult};
use crate::types::TokenResponse;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HOST};
use tracing::{error, info};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const ERROR_DESCRIPTION: &str = "error_description";

/// Client for the provider's token endpoint
#[derive(Clone)]
pub struct TokenClient {
    http_client: Client,
    token_endpoint: String,
    host: String,
    client_id: String,
}

impl TokenClient {
    pub fn new(
        http_client: Client,
        token_endpoint: impl Into<String>,
        host: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            token_endpoint: token_endpoint.into(),
            host: host.into(),
            client_id: client_id.into(),
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Codes are single-use: a failed exchange must not be retried with
    /// the same code.
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> SsoResult<TokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        let token = self.request_token(&form).await?;
        info!("Successfully exchanged code for tokens");
        Ok(token)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> SsoResult<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];

        let token = self.request_token(&form).await?;
        info!("Successfully refreshed access token");
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> SsoResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(HOST, &self.host)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = provider_error_message(&body);
            error!("Token request failed with status {}: {}", status, message);
            return Err(SsoError::ProviderError(message));
        }

        let raw: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SsoError::InvalidTokenResponse(e.to_string()))?;

        TokenResponse::from_json(raw)
    }
}

/// The provider's `error_description` when the error body carries one,
/// otherwise the body itself.
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get(ERROR_DESCRIPTION)
                .and_then(|description| description.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, TokenClient) {
        let mock_server = MockServer::start().await;
        let client = TokenClient::new(
            Client::new(),
            format!("{}/v2/oauth/token", mock_server.uri()),
            "login.eveonline.com",
            "my_client_id",
        );
        (mock_server, client)
    }

    #[test]
    fn test_provider_error_message() {
        assert_eq!(
            provider_error_message(r#"{"error":"invalid_grant","error_description":"bad code"}"#),
            "bad code"
        );
        assert_eq!(
            provider_error_message(r#"{"error":"invalid_grant"}"#),
            r#"{"error":"invalid_grant"}"#
        );
        assert_eq!(provider_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_exchange_code_request_shape() {
        let (mock_server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth/token"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(header("host", "login.eveonline.com"))
            .and(body_string(concat!(
                "grant_type=authorization_code&code=the_code",
                "&client_id=my_client_id&code_verifier=the-verifier_",
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T",
                "expires_in": 1199,
                "token_type": "Bearer",
                "refresh_token": "R"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = client.exchange_code("the_code", "the-verifier_").await.unwrap();

        assert_eq!(token.access_token.as_deref(), Some("T"));
        assert_eq!(token.refresh_token.as_deref(), Some("R"));
        assert_eq!(token.expires_in, Some(1199));
        assert_eq!(token.raw["token_type"], "Bearer");
    }

    #[tokio::test]
    async fn test_refresh_request_shape() {
        let (mock_server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth/token"))
            .and(body_string(
                "grant_type=refresh_token&refresh_token=R1&client_id=my_client_id",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T2",
                "refresh_token": "R2",
                "expires_in": 1200
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = client.refresh("R1").await.unwrap();
        assert_eq!(token.access_token.as_deref(), Some("T2"));
        assert_eq!(token.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_error_description_is_surfaced() {
        let (mock_server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_description": "invalid_grant"
            })))
            .mount(&mock_server)
            .await;

        let result = client.exchange_code("code", "verifier").await;
        match result {
            Err(SsoError::ProviderError(message)) => assert_eq!(message, "invalid_grant"),
            other => panic!("Expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_description_carries_raw_body() {
        let (mock_server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .mount(&mock_server)
            .await;

        let result = client.refresh("R").await;
        match result {
            Err(SsoError::ProviderError(message)) => {
                assert_eq!(message, r#"{"error":"invalid_client"}"#)
            }
            other => panic!("Expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let (mock_server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = client.exchange_code("code", "verifier").await;
        assert!(matches!(result, Err(SsoError::InvalidTokenResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Nothing listens on port 1
        let client = TokenClient::new(
            Client::new(),
            "http://127.0.0.1:1/v2/oauth/token",
            "login.eveonline.com",
            "id",
        );
        let result = client.refresh("R").await;

        assert!(matches!(result, Err(SsoError::TransportError(_))));
    }
}
