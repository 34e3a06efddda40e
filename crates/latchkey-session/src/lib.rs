//! Authenticated session management for Latchkey.
//!
//! This crate owns the lifecycle of the one session a client process has:
//!
//! 1. **Hydration**: reading a persisted session back at startup
//!    ([`hydrate`], run once by [`SessionController::hydrate`])
//! 2. **Transitions**: signing in, signing up, signing out
//!    ([`SessionController`]), with write-through to the store and the
//!    API binding kept in step
//! 3. **Projection**: handing the rest of the app a read-only view plus
//!    bound operations ([`SessionContext`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Screens (above)  ← branch on SessionContext { session, user, is_loading, error }
//!     ↕
//! Session Layer (this crate)  ← state machine, write-through, header sync
//!     ↕                ↕
//! Store (KeyValueStore)   Network (AuthApi, TokenBinding)
//! ```
//!
//! The network side is two traits so this crate never depends on an HTTP
//! client; `latchkey-api` implements both over `reqwest`.

mod auth;
mod context;
mod controller;
mod error;
mod hydrator;
mod session;

pub use auth::{AuthApi, TokenBinding};
pub use context::SessionContext;
pub use controller::SessionController;
pub use error::SessionError;
pub use hydrator::{Hydrated, hydrate};
pub use session::{Phase, SessionConfig, SessionState};
