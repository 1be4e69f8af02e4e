//! Authorization URL construction.
//!
//! The SSO expects query values exactly as given: only the separator between
//! scopes is percent-encoded (`%20`), everything else is inserted verbatim.
//! A generic form encoder would escape `:` and `/` inside `redirect_uri`,
//! so the query is assembled by [`ProviderQuery`] instead.

use crate::pkce::CODE_CHALLENGE_METHOD;

const LIST_SEPARATOR: &str = "%20";

#[derive(Debug, Clone)]
enum QueryValue {
    Single(String),
    List(Vec<String>),
}

/// Ordered, provider-compatible query string encoder.
#[derive(Debug, Clone, Default)]
pub struct ProviderQuery {
    params: Vec<(String, QueryValue)>,
}

impl ProviderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value that is written as-is.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), QueryValue::Single(value.into())));
        self
    }

    /// Append a list written as its elements joined by `%20`.
    pub fn list_param<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.params.push((key.into(), QueryValue::List(values)));
        self
    }

    /// Render as `?k=v&k2=v2`, or an empty string when there are no params.
    pub fn encode(&self) -> String {
        let mut query = String::new();

        for (key, value) in &self.params {
            query.push(if query.is_empty() { '?' } else { '&' });
            query.push_str(key);
            query.push('=');
            match value {
                QueryValue::Single(value) => query.push_str(value),
                QueryValue::List(values) => query.push_str(&values.join(LIST_SEPARATOR)),
            }
        }

        query
    }
}

/// Inputs of the authorization redirect
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    pub callback_url: &'a str,
    pub scopes: &'a [String],
    pub state: &'a str,
    pub code_challenge: &'a str,
}

impl AuthorizationRequest<'_> {
    /// Build the login URL. Parameter order is fixed.
    pub fn to_url(&self, authorization_endpoint: &str, client_id: &str) -> String {
        let query = ProviderQuery::new()
            .param("response_type", "code")
            .param("redirect_uri", self.callback_url)
            .param("client_id", client_id)
            .list_param("scope", self.scopes.iter().map(String::as_str))
            .param("code_challenge", self.code_challenge)
            .param("code_challenge_method", CODE_CHALLENGE_METHOD)
            .param("state", self.state);

        format!("{}{}", authorization_endpoint, query.encode())
    }
}
