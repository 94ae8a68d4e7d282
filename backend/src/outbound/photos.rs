//! Filesystem photo blob store.
//!
//! Writes decoded meter photos into a capability-scoped directory via
//! `cap-std`, so the adapter can never escape its configured root. Writes
//! run on the blocking pool.

use std::path::PathBuf;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};

use crate::domain::ports::{PhotoStore, PhotoStoreError};

/// Photo store rooted at a single uploads directory.
#[derive(Clone)]
pub struct DirPhotoStore {
    root: PathBuf,
}

impl DirPhotoStore {
    /// Create the store, ensuring the uploads directory exists.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PhotoStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|error| PhotoStoreError::write(error.to_string()))?;
        Ok(Self { root })
    }

    fn write_blocking(root: &PathBuf, name: &str, bytes: &[u8]) -> Result<(), PhotoStoreError> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| PhotoStoreError::write(error.to_string()))?;
        dir.write(name, bytes)
            .map_err(|error| PhotoStoreError::write(error.to_string()))
    }
}

#[async_trait]
impl PhotoStore for DirPhotoStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PhotoStoreError> {
        let root = self.root.clone();
        let name = name.to_owned();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::write_blocking(&root, &name, &bytes))
            .await
            .map_err(|error| PhotoStoreError::write(error.to_string()))?
    }
}
