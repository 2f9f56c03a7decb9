use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize user: {0}")]
    Serialize(#[from] serde_json::Error),
}
