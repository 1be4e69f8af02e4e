//! SSO protocol types.

use crate::error::{SsoError, SsoResult};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Everything needed to send the user to the SSO login page.
///
/// `state` and `code_verifier` must be kept by the caller, unmodified, until
/// the provider redirects back, then handed to
/// [`SsoProvider::handle_callback`](crate::SsoProvider::handle_callback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The URL the login button should point at
    pub url: String,
    pub state: String,
    /// PKCE verifier ("clear code"), never sent to the authorization endpoint
    pub code_verifier: String,
}

/// `code` and `state` taken from the provider's redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

impl CallbackParams {
    /// Parse the query string of a redirect URL.
    ///
    /// Accepts absolute URLs as well as a bare `/path?query` as seen by
    /// a web server handler. No network or state access happens here.
    pub fn from_redirect_url(redirect_url: &str) -> SsoResult<Self> {
        let url = match Url::parse(redirect_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://localhost/")
                    .map_err(|e| SsoError::CallbackParsingError(e.to_string()))?;
                Url::options()
                    .base_url(Some(&base))
                    .parse(redirect_url)
                    .map_err(|e| SsoError::CallbackParsingError(e.to_string()))?
            }
            Err(e) => return Err(SsoError::CallbackParsingError(e.to_string())),
        };

        if url.query().is_none_or(str::is_empty) {
            return Err(missing_parameters());
        }

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" if code.is_none() => code = Some(value.into_owned()),
                "state" if state.is_none() => state = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, state) {
            (Some(code), Some(state)) => Ok(Self { code, state }),
            _ => Err(missing_parameters()),
        }
    }
}

fn missing_parameters() -> SsoError {
    SsoError::CallbackParsingError("No query parameters in the callback".to_string())
}

/// Token endpoint payload.
///
/// Known fields are typed; `raw` keeps the body exactly as received. A known
/// field with an unexpected JSON type reads as absent rather than failing
/// the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub refresh_token: Option<String>,
    /// Whole seconds; integral floats such as `1199.0` are accepted
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub token_type: Option<String>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl TokenResponse {
    pub fn from_json(raw: serde_json::Value) -> SsoResult<Self> {
        let mut response: TokenResponse = serde_json::from_value(raw.clone())
            .map_err(|e| SsoError::InvalidTokenResponse(e.to_string()))?;
        response.raw = raw;
        Ok(response)
    }
}

/// Claims of a verified SSO access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(rename = "iss")]
    pub issuer: Option<String>,
    /// `CHARACTER:EVE:<character id>`
    #[serde(rename = "sub")]
    pub subject: Option<String>,
    /// Sent as a bare string when a single scope was granted
    #[serde(
        rename = "scp",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub scopes: Option<Vec<String>>,
    pub owner: Option<String>,
    #[serde(rename = "name")]
    pub character_name: Option<String>,
    /// Client id and `"EVE Online"`, as a string or a list
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub aud: Option<Vec<String>>,
    pub exp: Option<i64>,
    pub jti: Option<String>,
    pub kid: Option<String>,
    pub tenant: Option<String>,
    pub region: Option<String>,
}

impl IdentityClaims {
    /// The subject with the provider namespace removed.
    pub fn character_id(&self, subject_prefix: &str) -> Option<String> {
        self.subject.as_deref().map(|sub| {
            sub.strip_prefix(subject_prefix)
                .unwrap_or(sub)
                .to_string()
        })
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }))
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let number = value.as_number()?;
        number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|secs| *secs >= 0.0 && secs.fract() == 0.0 && *secs <= u64::MAX as f64)
                .map(|secs| secs as u64)
        })
    }))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(scope) => vec![scope],
            OneOrMany::Many(scopes) => scopes,
        }),
    )
}
