//! # File Storage
//!
//! This module provides a key-value backend on top of the local filesystem.
//! Each key is stored as a single `<key>.json` file in a specified directory.
//!
//! The main component of this module is the [`FileStorage`] struct, which implements the
//! [`KeyValueStore`] trait to provide persistent storage for the prompt store.
//!
//! # Examples
//!
//! ```rust
//! use panel_core::file_storage::FileStorage;
//! use panel_core::storage::KeyValueStore;
//! use tempfile::TempDir;
//!
//! // Create a temporary directory for our tests
//! let temp_dir = TempDir::new().unwrap();
//!
//! // Create a new file storage instance
//! let mut storage = FileStorage {
//!     base_path: temp_dir.path().to_path_buf(),
//! };
//!
//! storage.set("greeting", "[]").expect("Failed to write value");
//! assert_eq!(Some("[]".to_string()), storage.get("greeting").unwrap());
//! ```

use crate::storage::{KeyValueStore, StorageError};
use std::fs::create_dir_all;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::fs;
use tempfile::NamedTempFile;

/// A local file storage for key-value blobs.
pub struct FileStorage {
    /// The base directory where value files are stored.
    pub base_path: PathBuf,
}

impl KeyValueStore for FileStorage {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - If the key exists.
    /// * `Ok(None)` - If there is no file for the key.
    /// * `StorageError` - If the file exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores `value` under `key`.
    ///
    /// The value is written to a temporary file in `base_path` first and then renamed
    /// over the existing file, so a failed write leaves the old value in place.
    /// If `base_path` doesn't exist, it is created first.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the value is saved correctly.
    /// * `StorageError::InvalidBasePath` - If `base_path` exists but is not a directory.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_base_directory_exists()?;

        let mut file = NamedTempFile::new_in(&self.base_path)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.key_path(key)).map_err(|e| e.error)?;

        tracing::debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn ensure_base_directory_exists(&self) -> Result<(), StorageError> {
        if !self.base_path.exists() {
            create_dir_all(&self.base_path)?;
        } else if !self.base_path.is_dir() {
            return Err(StorageError::InvalidBasePath(
                self.base_path.display().to_string(),
            ));
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}
