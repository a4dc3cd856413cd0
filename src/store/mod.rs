//! Flat-file record storage.
//!
//! Every record is a single JSON document at `<base>/<collection>/<key>.json`.
//! There is no index and no cross-record atomicity; each request touches
//! exactly one file. Concurrent writers against the same key race with
//! last-write-wins semantics, which the filesystem layout accepts by design.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};

/// Collection holding one file per registered user, keyed by email.
pub const USERS: &str = "users";

/// Collection holding one file per issued session token, keyed by token id.
pub const TOKENS: &str = "tokens";

const STORAGE_EXT: &str = ".json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    AlreadyExists,
    #[error("record not found")]
    NotFound,
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One-file-per-record JSON store rooted at a base directory.
///
/// Cloning is cheap; clones share the same on-disk data.
#[derive(Clone, Debug)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the given collection directories if they are missing.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if a directory cannot be created.
    pub async fn ensure_collections(&self, collections: &[&str]) -> Result<(), StoreError> {
        for collection in collections {
            fs::create_dir_all(self.base_dir.join(collection)).await?;
        }
        Ok(())
    }

    fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{key}{STORAGE_EXT}"))
    }

    /// Persist a new record, failing if one already exists under `key`.
    ///
    /// # Errors
    /// `AlreadyExists` when the target file is present, `Serialize` when the
    /// document cannot be encoded, `Io` on any other filesystem fault.
    pub async fn create<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        document: &T,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(document)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.record_path(collection, key))
            .await
            .map_err(|err| {
                if err.kind() == ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists
                } else {
                    StoreError::Io(err)
                }
            })?;
        file.write_all(&payload).await?;
        file.flush().await?;
        Ok(())
    }

    /// Load and decode a record.
    ///
    /// A malformed or partial document decodes to the type's defaults instead
    /// of failing; record types tolerate missing fields.
    ///
    /// # Errors
    /// `NotFound` when no file exists under `key`, `Io` on read faults.
    pub async fn read<T>(&self, collection: &str, key: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let contents = fs::read(self.record_path(collection, key))
            .await
            .map_err(not_found_or_io)?;
        Ok(serde_json::from_slice(&contents).unwrap_or_default())
    }

    /// Replace an existing record in full (truncate and rewrite, never merge).
    ///
    /// Opening without `create` preserves the contract that an update never
    /// materializes a missing record.
    ///
    /// # Errors
    /// `NotFound` when the record does not exist, `Serialize`/`Io` otherwise.
    pub async fn update<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        document: &T,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(document)?;
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.record_path(collection, key))
            .await
            .map_err(not_found_or_io)?;
        file.write_all(&payload).await?;
        file.flush().await?;
        Ok(())
    }

    /// Remove a record. Failures surface to the caller, never swallowed.
    ///
    /// # Errors
    /// `NotFound` when the record does not exist, `Io` on removal faults.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        fs::remove_file(self.record_path(collection, key))
            .await
            .map_err(not_found_or_io)
    }

    /// List the keys present in a collection, storage extension stripped.
    ///
    /// An empty collection yields an empty list; an unreadable directory is
    /// an error. Files without the storage extension are ignored.
    ///
    /// # Errors
    /// `Io` when the collection directory cannot be read.
    pub async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(self.base_dir.join(collection)).await?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(key) = name.strip_suffix(STORAGE_EXT) {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn not_found_or_io(err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound
    } else {
        StoreError::Io(err)
    }
}
