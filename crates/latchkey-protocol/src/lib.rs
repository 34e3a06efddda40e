//! Data model and wire format for Latchkey.
//!
//! This crate defines the "nouns" the session layer works with:
//!
//! - **Types** ([`SessionToken`], [`UserProfile`], [`Credentials`],
//!   [`SignUpFields`], [`AuthResponse`], [`ErrorBody`]): the values that
//!   travel between the app and the auth backend, and that get cached in
//!   the key-value store.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a cached profile is
//!   turned into the opaque string the store holds, and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing that.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about storage backends or HTTP. It
//! only knows what a session looks like and how to serialize it.
//!
//! ```text
//! Store (strings) → Protocol (SessionToken, UserProfile) → Session (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    AuthResponse, Credentials, ErrorBody, GUEST_USER_ID, SessionToken,
    SignUpFields, UserProfile,
};
