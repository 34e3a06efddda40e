//! The remote auth endpoints over HTTP.

use latchkey_protocol::{
    AuthResponse, Codec, Credentials, ErrorBody, JsonCodec, SignUpFields,
};
use latchkey_session::{AuthApi, SessionError};
use reqwest::{Method, Response};
use serde::Serialize;

use crate::ApiClient;

const LOGIN_PATH: &str = "/auth/login";
const SIGN_UP_PATH: &str = "/auth/signup";
const LOGOUT_PATH: &str = "/auth/logout";

/// [`AuthApi`] over the backend's JSON endpoints.
///
/// | Call      | Request                              | Success body      |
/// |-----------|--------------------------------------|-------------------|
/// | `login`   | `POST /auth/login {email, password}` | `{token, user}`   |
/// | `sign_up` | `POST /auth/signup {name, email, ...}` | `{token, user}` |
/// | `logout`  | `POST /auth/logout` (authorized)     | ignored           |
///
/// Requests go through the shared [`ApiClient`], so `logout` carries the
/// session's header automatically.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
    codec: JsonCodec,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            codec: JsonCodec,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn authenticate<B>(&self, path: &str, body: &B) -> Result<AuthResponse, SessionError>
    where
        B: Serialize + Sync,
    {
        let response = self
            .client
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(network)?;
        let response = ensure_success(response).await?;

        let text = response.text().await.map_err(network)?;
        self.codec
            .decode::<AuthResponse>(&text)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))
    }
}

impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, SessionError> {
        self.authenticate(LOGIN_PATH, credentials).await
    }

    async fn sign_up(&self, fields: &SignUpFields) -> Result<AuthResponse, SessionError> {
        self.authenticate(SIGN_UP_PATH, fields).await
    }

    async fn logout(&self) -> Result<(), SessionError> {
        let response = self
            .client
            .request(Method::POST, LOGOUT_PATH)
            .send()
            .await
            .map_err(network)?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`SessionError::Rejected`], pulling the
/// server's message out of the body when it's structured.
async fn ensure_success(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // A body we can't read is just a body without a message.
    let body = response.text().await.unwrap_or_default();
    Err(SessionError::Rejected {
        status: status.as_u16(),
        message: ErrorBody::message_from(&body),
    })
}

fn network(e: reqwest::Error) -> SessionError {
    SessionError::Network(e.to_string())
}
