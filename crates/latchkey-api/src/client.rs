//! The shared network client and its session-bound authorization header.

use std::sync::Arc;
use std::time::Duration;

use latchkey_protocol::SessionToken;
use latchkey_session::TokenBinding;
use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder};

use crate::ApiError;

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme and host, optionally with a path prefix. A trailing slash is
    /// ignored.
    pub base_url: String,

    /// Per-request timeout, covering connect through reading the body.
    pub timeout: Duration,

    /// Prefix of the `Authorization` value: `<scheme> <token>`.
    pub auth_scheme: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
            auth_scheme: "Bearer".to_string(),
        }
    }
}

/// A `reqwest` client plus a shared, swappable `Authorization` header.
///
/// Clones share the header slot: setting a token through one clone is seen
/// by every other. The header is copied into a request when the request is
/// *built*, so:
///
/// ```text
/// let a = client.request(GET, "/me");   // carries token 1
/// client.set_auth_token(&token2);
/// let b = client.request(GET, "/me");   // carries token 2
/// // `a` still carries token 1
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_scheme: String,
    auth_header: Arc<RwLock<Option<HeaderValue>>>,
}

impl ApiClient {
    /// Builds the client.
    ///
    /// # Errors
    /// [`ApiError::InvalidBaseUrl`] if `base_url` isn't HTTP(S), or
    /// [`ApiError::Client`] if the TLS backend fails to initialize.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            auth_scheme: config.auth_scheme.clone(),
            auth_header: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The absolute URL for an endpoint path like `/auth/login`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request carrying the authorization header current *now*.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.auth_header() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// The header value requests built now would carry, if any.
    pub fn auth_header(&self) -> Option<HeaderValue> {
        self.auth_header.read().clone()
    }
}

impl TokenBinding for ApiClient {
    fn set_auth_token(&self, token: &SessionToken) {
        let raw = format!("{} {}", self.auth_scheme, token.as_str());
        match HeaderValue::from_str(&raw) {
            Ok(mut value) => {
                value.set_sensitive(true);
                *self.auth_header.write() = Some(value);
                tracing::debug!("authorization header set");
            }
            Err(e) => {
                // Tokens are validated on the way in, so only a bad
                // configured scheme can land here. Never send a stale one.
                *self.auth_header.write() = None;
                tracing::error!(error = %e, "authorization header rejected; cleared");
            }
        }
    }

    fn clear_auth_token(&self) {
        *self.auth_header.write() = None;
        tracing::debug!("authorization header cleared");
    }
}
