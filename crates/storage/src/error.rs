// SPDX-License-Identifier: MIT

//! Errors raised by the definition and instance stores.

use layerform_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("I/O error reading {location}: {source}")]
    Io { location: String, #[source] source: std::io::Error },

    #[error("malformed document at {location}: {source}")]
    Decode { location: String, #[source] source: serde_json::Error },

    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("schema version {found} is newer than the version this build understands ({current})")]
    SchemaTooNew { found: u32, current: u32 },
}

impl StorageError {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::NotFound(_) => "not_found",
            StorageError::Io { .. } => "store_unavailable",
            StorageError::Decode { .. } => "store_unavailable",
            StorageError::ObjectStore(_) => "store_unavailable",
            StorageError::SchemaTooNew { .. } => "schema_too_new",
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => CoreError::NotFound(what),
            StorageError::SchemaTooNew { found, current } => {
                CoreError::SchemaTooNew { found, current }
            }
            other => CoreError::StoreUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
