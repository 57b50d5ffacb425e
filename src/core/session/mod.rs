//! Session and identity
//!
//! See [`SessionProvider`].

pub mod provider;

pub use provider::{NewAccount, SessionProvider, SESSION_CACHE_KEY};
