//! Network side of Latchkey: the API binding and the auth endpoints.
//!
//! - [`ApiClient`]: one shared `reqwest` client whose `Authorization`
//!   header follows the session. It implements
//!   [`TokenBinding`](latchkey_session::TokenBinding), so the session
//!   controller can set and clear the header directly.
//! - [`HttpAuthApi`]: the remote login / sign-up / logout endpoints,
//!   implementing [`AuthApi`](latchkey_session::AuthApi) on top of an
//!   `ApiClient`.
//!
//! Every other part of the app that talks to the backend should build its
//! requests through [`ApiClient::request`], so it automatically carries
//! whatever session is current.

mod auth;
mod client;
mod error;

pub use auth::HttpAuthApi;
pub use client::{ApiClient, ApiConfig};
pub use error::ApiError;

/// Re-exported so callers of [`ApiClient::request`] needn't depend on `reqwest`.
pub use reqwest::Method;
