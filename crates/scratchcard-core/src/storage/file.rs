use std::path::{Path, PathBuf};

use super::KeyValueStorage;
use crate::error::StorageError;

/// Stores each key as a file named after it inside `dir`.
///
/// The directory is created on the first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::io(path, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let path = self.key_path(key);
        std::fs::write(&path, value).map_err(|e| StorageError::io(path, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| StorageError::io(path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("nested").join("session"));

        storage.set("token", "abc123").unwrap();

        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc123"));
        assert!(tmp.path().join("nested/session/token").exists());
    }

    #[test]
    fn test_missing_key_reads_none() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());

        assert_eq!(storage.get("user").unwrap(), None);
        assert!(storage.remove("user").is_ok());
    }

    #[test]
    fn test_remove_deletes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());

        storage.set("user", "{}").unwrap();
        storage.remove("user").unwrap();

        assert!(!tmp.path().join("user").exists());
        assert_eq!(storage.get("user").unwrap(), None);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let storage = FileStorage::new(&blocker);
        let err = storage.set("token", "abc").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
