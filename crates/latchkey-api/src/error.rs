/// Errors building an [`ApiClient`](crate::ApiClient).
///
/// Request failures are not here: those are reported through
/// [`SessionError`](latchkey_session::SessionError) by the auth endpoints,
/// or as plain `reqwest::Error`s for requests the app sends itself.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The base URL isn't an `http://` or `https://` URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed (TLS backend).
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}
