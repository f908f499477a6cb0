// SPDX-License-Identifier: MIT

use std::sync::Arc;

use layerform_adapters::FakeProvisioner;
use layerform_core::test_support::{DefinitionBuilder, InstanceBuilder};
use layerform_storage::{DefinitionStore, InstanceStore};

use super::*;
use crate::config::{local_backend, Backend};

#[tokio::test]
async fn refreshes_an_existing_instance() {
    let dir = tempfile::tempdir().unwrap();
    let stores = local_backend(dir.path().to_str().unwrap());
    let vpc = DefinitionBuilder::new("vpc").build();
    stores.instances.save(InstanceBuilder::new("vpc", "default").sha(&vpc.sha).build()).await.unwrap();
    stores.definitions.update(vec![vpc]).await.unwrap();
    let engine = layerform_engine::Engine::new(stores.definitions, stores.instances, Arc::new(FakeProvisioner::new()));
    let instances = engine.instances.clone();

    run(Backend::Local(engine), "vpc".to_string(), "default".to_string(), Vec::new()).await.unwrap();

    let refreshed = instances.get("vpc", "default").await.unwrap();
    assert_eq!(refreshed.status, layerform_core::LayerInstanceStatus::Alive);
}
