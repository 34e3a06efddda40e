//! # Latchkey
//!
//! Persistent authenticated sessions for mobile and web clients.
//!
//! Latchkey keeps one sign-in alive across restarts. It stores the session
//! token in whatever the platform offers (a browser storage area on the
//! web, an encrypted file store on devices), reads it back at startup, and
//! keeps the shared HTTP client's `Authorization` header in step with it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latchkey::prelude::*;
//!
//! # async fn run() -> Result<(), LatchkeyError> {
//! latchkey::telemetry::init_tracing();
//!
//! let app = Latchkey::builder()
//!     .base_url("https://api.example.com")
//!     .build()
//!     .await?;
//!
//! let session = app.context();
//! session.wait_until_loaded().await;
//! if session.session().is_none() {
//!     session.sign_in("a@b.com", "pw").await?;
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod error;
pub mod telemetry;

pub use app::{AppController, AppSession, Latchkey, LatchkeyBuilder};
pub use error::LatchkeyError;

pub use latchkey_api as api;
pub use latchkey_protocol as protocol;
pub use latchkey_session as session;
pub use latchkey_store as store;

/// Everything an app usually needs, in one import.
pub mod prelude {
    pub use crate::{AppSession, Latchkey, LatchkeyBuilder, LatchkeyError};
    pub use latchkey_api::{ApiClient, ApiConfig};
    pub use latchkey_protocol::{SessionToken, SignUpFields, UserProfile};
    pub use latchkey_session::{Phase, SessionConfig, SessionError, SessionState};
    pub use latchkey_store::{Platform, StoreConfig};
}
