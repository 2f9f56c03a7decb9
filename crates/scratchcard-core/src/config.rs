//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! which storage backend holds the session, page metadata, and the remote
//! image allowlist.
//!
//! Configuration is stored at `~/.config/scratchcard/config.json`. The
//! `SCRATCHCARD_STORAGE` and `SCRATCHCARD_STORAGE_DIR` environment variables
//! override the storage settings.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::images::ImagePolicy;
use crate::storage::{FileStorage, KeyValueStorage, KeyringStorage, MemoryStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "scratchcard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable selecting the storage backend
pub const STORAGE_ENV: &str = "SCRATCHCARD_STORAGE";

/// Environment variable overriding the storage directory
pub const STORAGE_DIR_ENV: &str = "SCRATCHCARD_STORAGE_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown storage backend: {}", other),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Keyring => write!(f, "keyring"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Page title and description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub title: String,
    pub description: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            title: "Raspadinha".to_string(),
            description: "Raspadinhas online".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageBackend,
    pub storage_dir: Option<PathBuf>,
    pub metadata: AppMetadata,
    pub images: ImagePolicy,
}

impl Config {
    /// Load from the user config directory, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(backend) = lookup(STORAGE_ENV) {
            self.storage = backend
                .parse()
                .with_context(|| format!("Invalid {}", STORAGE_ENV))?;
        }
        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|d| !d.is_empty()) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed session and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Build the storage medium selected by this config
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>> {
        let storage: Box<dyn KeyValueStorage> = match self.storage {
            StorageBackend::File => Box::new(FileStorage::new(self.cache_dir()?)),
            StorageBackend::Keyring => Box::new(KeyringStorage::new()),
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::images::RemotePattern;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.json")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.metadata.title, "Raspadinha");
        assert!(config.images.remote_patterns.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.storage = StorageBackend::Keyring;
        config.images.remote_patterns.push(RemotePattern::https("**.example.com"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"images": {"remote_patterns": [{"protocol": "https", "hostname": "cdn.example.com"}]}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage, StorageBackend::File);
        assert!(config.images.is_allowed("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [(STORAGE_ENV, "Memory"), (STORAGE_DIR_ENV, "/tmp/scratch")].into();
        let mut config = Config::default();

        config.apply_env(|name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/scratch"));
    }

    #[test]
    fn test_env_rejects_unknown_backend() {
        let mut config = Config::default();
        let result = config.apply_env(|name| (name == STORAGE_ENV).then(|| "cloud".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_file_storage_in_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            storage_dir: Some(tmp.path().to_path_buf()),
            ..Config::default()
        };

        let storage = config.open_storage().unwrap();
        storage.set("token", "abc").unwrap();
        assert!(tmp.path().join("token").exists());
    }
}
