// SPDX-License-Identifier: MIT

//! The definition store: loads and publishes the whole set of layer
//! definitions. Backed by a local file or an object store — callers only
//! see the [`DefinitionStore`] trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use layerform_core::LayerDefinition;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::StorageError;
use crate::medium::Medium;

/// Current (and, so far, only) schema version of the definition document.
pub const DEFINITION_DOC_VERSION: u32 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct DefinitionDocument {
    version: u32,
    layers: BTreeMap<String, LayerDefinition>,
}

#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LayerDefinition>, StorageError>;
    async fn get(&self, name: &str) -> Result<LayerDefinition, StorageError>;

    /// Transitive dependencies of `def`, in the order they are first
    /// encountered by a depth-first walk over `def.dependencies`.
    async fn resolve_deps(&self, def: &LayerDefinition) -> Result<Vec<LayerDefinition>, StorageError> {
        let all = self.list().await?;
        let by_name: BTreeMap<&str, &LayerDefinition> =
            all.iter().map(|d| (d.name.as_str(), d)).collect();

        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack: Vec<&str> = def.dependencies.iter().map(String::as_str).collect();
        stack.reverse();

        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let found = by_name
                .get(name)
                .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
            out.push((*found).clone());
            let mut rest: Vec<&str> = found.dependencies.iter().map(String::as_str).collect();
            rest.reverse();
            stack.extend(rest);
        }

        Ok(out)
    }

    /// Replace the whole set of definitions. Implementations must make this
    /// atomic: either every definition is published or none are.
    async fn update(&self, defs: Vec<LayerDefinition>) -> Result<(), StorageError>;

    fn location(&self) -> String;
}

/// A [`DefinitionStore`] backed by any [`Medium`] (local file or object
/// store) holding one JSON document.
pub struct FileDefinitionStore<M: Medium> {
    medium: M,
}

impl<M: Medium> FileDefinitionStore<M> {
    pub fn new(medium: M) -> Self {
        FileDefinitionStore { medium }
    }

    async fn load_document(&self) -> Result<DefinitionDocument, StorageError> {
        match self.medium.load().await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| StorageError::Decode { location: self.medium.location(), source }),
            Err(StorageError::NotFound(_)) => {
                Ok(DefinitionDocument { version: DEFINITION_DOC_VERSION, layers: BTreeMap::new() })
            }
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl<M: Medium> DefinitionStore for FileDefinitionStore<M> {
    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn list(&self) -> Result<Vec<LayerDefinition>, StorageError> {
        Ok(self.load_document().await?.layers.into_values().collect())
    }

    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn get(&self, name: &str) -> Result<LayerDefinition, StorageError> {
        self.load_document()
            .await?
            .layers
            .remove(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    #[instrument(skip(self, defs), fields(location = %self.medium.location(), count = defs.len()))]
    async fn update(&self, defs: Vec<LayerDefinition>) -> Result<(), StorageError> {
        let layers = defs.into_iter().map(|d| (d.name.clone(), d)).collect();
        let doc = DefinitionDocument { version: DEFINITION_DOC_VERSION, layers };
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|source| StorageError::Decode { location: self.medium.location(), source })?;
        self.medium.save(bytes).await
    }

    fn location(&self) -> String {
        self.medium.location()
    }
}

#[cfg(test)]
#[path = "definitions_tests.rs"]
mod tests;
