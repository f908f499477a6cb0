// SPDX-License-Identifier: MIT

//! The narrow storage-medium abstraction that the definition and instance
//! stores are generic over: `load`/`save` a whole document's bytes, plus a
//! human-readable `location` for error messages and `list instances`
//! diagnostics. Adding a new medium means implementing this trait, not
//! touching the stores themselves.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;

use crate::error::StorageError;

#[async_trait]
pub trait Medium: Send + Sync {
    async fn load(&self) -> Result<Vec<u8>, StorageError>;
    async fn save(&self, bytes: Vec<u8>) -> Result<(), StorageError>;
    fn location(&self) -> String;
}

/// A single JSON document on the local filesystem.
pub struct LocalFileMedium {
    path: PathBuf,
}

impl LocalFileMedium {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalFileMedium { path: path.into() }
    }
}

#[async_trait]
impl Medium for LocalFileMedium {
    async fn load(&self) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(self.location()))
            }
            Err(source) => Err(StorageError::Io { location: self.location(), source }),
        }
    }

    async fn save(&self, bytes: Vec<u8>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io { location: self.location(), source })?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StorageError::Io { location: self.location(), source })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A single JSON document under a fixed key in an object store (S3, GCS, or
/// any other backend the `object_store` crate supports).
pub struct ObjectStoreMedium {
    store: Arc<dyn ObjectStore>,
    key: ObjectPath,
}

impl ObjectStoreMedium {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl AsRef<str>) -> Self {
        ObjectStoreMedium { store, key: ObjectPath::from(key.as_ref()) }
    }
}

#[async_trait]
impl Medium for ObjectStoreMedium {
    async fn load(&self) -> Result<Vec<u8>, StorageError> {
        match self.store.get(&self.key).await {
            Ok(result) => Ok(result.bytes().await?.to_vec()),
            Err(object_store::Error::NotFound { .. }) => Err(StorageError::NotFound(self.location())),
            Err(source) => Err(StorageError::ObjectStore(source)),
        }
    }

    async fn save(&self, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.store.put(&self.key, bytes.into()).await?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("object://{}", self.key)
    }
}

#[cfg(test)]
#[path = "medium_tests.rs"]
mod tests;
