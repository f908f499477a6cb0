// SPDX-License-Identifier: MIT

//! The error taxonomy shared by every backend and adapter.
//!
//! Each crate defines its own `thiserror` enum for the errors it can
//! produce locally (I/O, HTTP, subprocess failures, ...), but every such
//! error maps onto one of these kinds so the CLI layer can render a
//! consistent message and exit code regardless of which backend is active.

use thiserror::Error;

/// A kind-level classification of every error the engine can surface.
///
/// This is deliberately not the error type itself — individual crates keep
/// their own richer error enums (see `layerform-storage`'s
/// `DefinitionStoreError`, `layerform-adapters`'s `ProvisionerError`, etc.)
/// and map into these kinds for cross-crate reporting.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} has dependants and cannot be killed")]
    HasDependants(String),

    #[error("invalid name \"{0}\"")]
    InvalidName(String),

    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("provisioner failed: {0}")]
    ProvisionerFailure(String),

    #[error("provisioner not found: {0}")]
    ProvisionerNotFound(String),

    #[error("schema version {found} is newer than the version this build understands ({current}); created by a newer release")]
    SchemaTooNew { found: u32, current: u32 },

    #[error("operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Stable, lower-case tag for this error's kind, used in structured logs
    /// and in tests that assert on the *kind* of failure rather than its
    /// exact message.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::AlreadyExists(_) => "already_exists",
            CoreError::HasDependants(_) => "has_dependants",
            CoreError::InvalidName(_) => "invalid_name",
            CoreError::InvalidDefinition(_) => "invalid_definition",
            CoreError::StoreUnavailable(_) => "store_unavailable",
            CoreError::ProvisionerFailure(_) => "provisioner_failure",
            CoreError::ProvisionerNotFound(_) => "provisioner_not_found",
            CoreError::SchemaTooNew { .. } => "schema_too_new",
            CoreError::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
