// SPDX-License-Identifier: MIT

//! In-memory stores for engine tests, avoiding real file IO.

use std::sync::Mutex;

use async_trait::async_trait;
use layerform_core::{LayerDefinition, LayerInstance};
use layerform_storage::{DefinitionStore, InstanceStore, StorageError};

pub struct MemoryDefinitionStore {
    defs: Mutex<Vec<LayerDefinition>>,
}

impl MemoryDefinitionStore {
    pub fn new(defs: Vec<LayerDefinition>) -> Self {
        MemoryDefinitionStore { defs: Mutex::new(defs) }
    }
}

#[async_trait]
impl DefinitionStore for MemoryDefinitionStore {
    async fn list(&self) -> Result<Vec<LayerDefinition>, StorageError> {
        Ok(self.defs.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn get(&self, name: &str) -> Result<LayerDefinition, StorageError> {
        self.defs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn update(&self, defs: Vec<LayerDefinition>) -> Result<(), StorageError> {
        *self.defs.lock().unwrap_or_else(|e| e.into_inner()) = defs;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

pub struct MemoryInstanceStore {
    instances: Mutex<Vec<LayerInstance>>,
}

impl MemoryInstanceStore {
    pub fn new(instances: Vec<LayerInstance>) -> Self {
        MemoryInstanceStore { instances: Mutex::new(instances) }
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn get(&self, layer: &str, instance: &str) -> Result<LayerInstance, StorageError> {
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|i| i.definition_name == layer && i.instance_name == instance)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{layer}/{instance}")))
    }

    async fn list_by_layer(&self, layer: &str) -> Result<Vec<LayerInstance>, StorageError> {
        Ok(self
            .instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|i| i.definition_name == layer)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<LayerInstance>, StorageError> {
        Ok(self.instances.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, instance: LayerInstance) -> Result<(), StorageError> {
        let mut all = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        match all
            .iter_mut()
            .find(|i| i.definition_name == instance.definition_name && i.instance_name == instance.instance_name)
        {
            Some(existing) => *existing = instance,
            None => all.push(instance),
        }
        Ok(())
    }

    async fn delete(&self, layer: &str, instance: &str) -> Result<(), StorageError> {
        let mut all = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        let before = all.len();
        all.retain(|i| !(i.definition_name == layer && i.instance_name == instance));
        if all.len() == before {
            return Err(StorageError::NotFound(format!("{layer}/{instance}")));
        }
        Ok(())
    }
}
