// SPDX-License-Identifier: MIT

//! Errors raised by the spawn/kill/refresh engine.

use layerform_adapters::AdapterError;
use layerform_core::CoreError;
use layerform_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("instance \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("instance \"{0}\" has dependants and cannot be killed: {1:?}")]
    HasDependants(String, Vec<String>),

    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("workdir error: {0}")]
    Workdir(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::AlreadyExists(_) => "already_exists",
            EngineError::HasDependants(..) => "has_dependants",
            EngineError::InvalidDefinition(_) => "invalid_definition",
            EngineError::Storage(e) => e.kind(),
            EngineError::Adapter(e) => e.kind(),
            EngineError::Workdir(_) => "store_unavailable",
            EngineError::Cancelled => "cancelled",
        }
    }
}

impl From<EngineError> for CoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(what) => CoreError::NotFound(what),
            EngineError::AlreadyExists(what) => CoreError::AlreadyExists(what),
            EngineError::HasDependants(what, _) => CoreError::HasDependants(what),
            EngineError::InvalidDefinition(msg) => CoreError::InvalidDefinition(msg),
            EngineError::Cancelled => CoreError::Cancelled,
            EngineError::Storage(e) => e.into(),
            EngineError::Adapter(e) => e.into(),
            EngineError::Workdir(msg) => CoreError::StoreUnavailable(msg),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
