// SPDX-License-Identifier: MIT

//! The instance store: loads and persists individual layer instance
//! records, migrating legacy (version 0) documents on read.

use async_trait::async_trait;
use layerform_core::{LayerInstance, LayerInstanceV0, CURRENT_INSTANCE_VERSION};
use serde::Deserialize;
use tracing::instrument;

use crate::error::StorageError;
use crate::medium::Medium;

/// `version` is an integer, which rules out serde's internally-tagged enum
/// representation (it wants string tags). Sniff it by hand instead.
fn decode_document(bytes: &[u8], location: &str) -> Result<Vec<LayerInstance>, StorageError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|source| StorageError::Decode { location: location.to_string(), source })?;

    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;

    if version > CURRENT_INSTANCE_VERSION {
        return Err(StorageError::SchemaTooNew { found: version, current: CURRENT_INSTANCE_VERSION });
    }

    if version == 0 {
        #[derive(Deserialize)]
        struct LegacyDocument {
            #[serde(default)]
            states: Vec<LayerInstanceV0>,
        }
        let doc: LegacyDocument = serde_json::from_value(value)
            .map_err(|source| StorageError::Decode { location: location.to_string(), source })?;
        Ok(doc.states.into_iter().map(LayerInstanceV0::into_current).collect())
    } else {
        #[derive(Deserialize)]
        struct CurrentDocument {
            #[serde(default)]
            instances: Vec<LayerInstance>,
        }
        let doc: CurrentDocument = serde_json::from_value(value)
            .map_err(|source| StorageError::Decode { location: location.to_string(), source })?;
        Ok(doc.instances)
    }
}

fn encode_document(instances: &[LayerInstance]) -> serde_json::Value {
    serde_json::json!({
        "version": CURRENT_INSTANCE_VERSION,
        "instances": instances,
    })
}

#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn get(&self, layer: &str, instance: &str) -> Result<LayerInstance, StorageError>;
    async fn list_by_layer(&self, layer: &str) -> Result<Vec<LayerInstance>, StorageError>;
    async fn list_all(&self) -> Result<Vec<LayerInstance>, StorageError>;
    /// Upsert, keyed by `(definition_name, instance_name)`.
    async fn save(&self, instance: LayerInstance) -> Result<(), StorageError>;
    async fn delete(&self, layer: &str, instance: &str) -> Result<(), StorageError>;
}

/// An [`InstanceStore`] backed by any [`Medium`] holding one JSON document.
pub struct FileInstanceStore<M: Medium> {
    medium: M,
}

impl<M: Medium> FileInstanceStore<M> {
    pub fn new(medium: M) -> Self {
        FileInstanceStore { medium }
    }

    async fn load_all(&self) -> Result<Vec<LayerInstance>, StorageError> {
        match self.medium.load().await {
            Ok(bytes) => decode_document(&bytes, &self.medium.location()),
            Err(StorageError::NotFound(_)) => Ok(Vec::new()),
            Err(other) => Err(other),
        }
    }

    async fn save_all(&self, instances: &[LayerInstance]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&encode_document(instances))
            .map_err(|source| StorageError::Decode { location: self.medium.location(), source })?;
        self.medium.save(bytes).await
    }
}

#[async_trait]
impl<M: Medium> InstanceStore for FileInstanceStore<M> {
    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn get(&self, layer: &str, instance: &str) -> Result<LayerInstance, StorageError> {
        self.load_all()
            .await?
            .into_iter()
            .find(|i| i.definition_name == layer && i.instance_name == instance)
            .ok_or_else(|| StorageError::NotFound(format!("{layer}/{instance}")))
    }

    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn list_by_layer(&self, layer: &str) -> Result<Vec<LayerInstance>, StorageError> {
        Ok(self.load_all().await?.into_iter().filter(|i| i.definition_name == layer).collect())
    }

    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn list_all(&self) -> Result<Vec<LayerInstance>, StorageError> {
        self.load_all().await
    }

    #[instrument(skip(self, instance), fields(location = %self.medium.location(), layer = %instance.definition_name, instance = %instance.instance_name))]
    async fn save(&self, instance: LayerInstance) -> Result<(), StorageError> {
        let mut all = self.load_all().await?;
        match all.iter_mut().find(|i| {
            i.definition_name == instance.definition_name && i.instance_name == instance.instance_name
        }) {
            Some(existing) => *existing = instance,
            None => all.push(instance),
        }
        self.save_all(&all).await
    }

    #[instrument(skip(self), fields(location = %self.medium.location()))]
    async fn delete(&self, layer: &str, instance: &str) -> Result<(), StorageError> {
        let mut all = self.load_all().await?;
        let before = all.len();
        all.retain(|i| !(i.definition_name == layer && i.instance_name == instance));
        if all.len() == before {
            return Err(StorageError::NotFound(format!("{layer}/{instance}")));
        }
        self.save_all(&all).await
    }
}

#[cfg(test)]
#[path = "instances_tests.rs"]
mod tests;
