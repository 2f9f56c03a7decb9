//! Session management: who is logged in right now.
//!
//! This module provides:
//! - `SessionStore`: the user + token pair, persisted to durable storage and
//!   restored on start-up, with synchronous change notification
//! - `SessionSnapshot` / `SessionState`: read-only views of the session
//! - `SessionProvider` / `use_session`: scoped delivery of the store to
//!   code that needs it

pub mod provider;
pub mod state;
pub mod store;

pub use provider::{try_use_session, use_session, SessionProvider};
pub use state::{SessionSnapshot, SessionState};
pub use store::{SessionStore, SubscriptionId};
