//! Core library for scratchcard: the client-side session layer.
//!
//! The `SessionStore` keeps the logged-in user and bearer token, persists
//! them to a `KeyValueStorage` backend and restores them on start-up.
//! `SessionProvider` makes a store reachable to the code running inside
//! it. `Config` selects the storage backend and carries the page metadata
//! and remote image allowlist.

pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod session;
pub mod storage;

pub use config::{AppMetadata, Config, StorageBackend};
pub use error::{SessionError, StorageError};
pub use images::{ImagePolicy, RemotePattern};
pub use models::{InviteCode, User, Wallet};
pub use session::{
    try_use_session, use_session, SessionProvider, SessionSnapshot, SessionState, SessionStore,
    SubscriptionId,
};
pub use storage::{FileStorage, KeyValueStorage, KeyringStorage, MemoryStorage};
