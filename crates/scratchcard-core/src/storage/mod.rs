//! Durable key-value storage backing the session store.
//!
//! The store owns two keys, `token` and `user`, in whichever medium it is
//! given:
//! - `FileStorage`: one file per key in the application cache directory
//! - `KeyringStorage`: OS keychain entries
//! - `MemoryStorage`: in-process map, lost on exit

pub mod file;
pub mod keychain;
pub mod memory;

pub use self::file::FileStorage;
pub use self::keychain::KeyringStorage;
pub use self::memory::MemoryStorage;

use crate::error::StorageError;

/// Storage key holding the raw bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the JSON-serialized user
pub const USER_KEY: &str = "user";

/// A synchronous string-to-string store.
///
/// Removing a key that is not present succeeds.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
