// SPDX-License-Identifier: MIT

//! Errors raised by the provisioner adapter and the remote backend client.

use layerform_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("provisioner binary not found: {0}")]
    ProvisionerNotFound(String),

    #[error("provisioner {op} exited with status {status}: {stderr}")]
    ProvisionerFailed { op: &'static str, status: i32, stderr: String },

    #[error("failed to launch provisioner: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error in {context}: {source}")]
    Io { context: String, #[source] source: std::io::Error },

    #[error("malformed provisioner output ({context}): {source}")]
    Decode { context: String, #[source] source: serde_json::Error },

    #[error("malformed HCL in {path}: {reason}")]
    Hcl { path: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Http { url: String, #[source] source: reqwest::Error },

    #[error("remote backend returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl AdapterError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::ProvisionerNotFound(_) => "provisioner_not_found",
            AdapterError::ProvisionerFailed { .. } => "provisioner_failure",
            AdapterError::Spawn(_) => "provisioner_failure",
            AdapterError::Io { .. } => "store_unavailable",
            AdapterError::Decode { .. } => "provisioner_failure",
            AdapterError::Hcl { .. } => "invalid_definition",
            AdapterError::Http { .. } => "store_unavailable",
            AdapterError::RemoteStatus { .. } => "store_unavailable",
            AdapterError::Cancelled => "cancelled",
        }
    }
}

impl From<AdapterError> for CoreError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::ProvisionerNotFound(bin) => CoreError::ProvisionerNotFound(bin),
            AdapterError::Cancelled => CoreError::Cancelled,
            AdapterError::Hcl { path, reason } => {
                CoreError::InvalidDefinition(format!("{path}: {reason}"))
            }
            other => CoreError::ProvisionerFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
