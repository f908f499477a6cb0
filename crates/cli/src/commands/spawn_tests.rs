// SPDX-License-Identifier: MIT

use std::sync::Arc;

use layerform_adapters::FakeProvisioner;
use layerform_core::test_support::DefinitionBuilder;
use layerform_storage::DefinitionStore;

use super::*;
use crate::config::{local_backend, Backend};

#[tokio::test]
async fn spawns_a_leaf_layer() {
    let dir = tempfile::tempdir().unwrap();
    let stores = local_backend(dir.to_str().unwrap());
    stores.definitions.update(vec![DefinitionBuilder::new("vpc").build()]).await.unwrap();
    let engine = layerform_engine::Engine::new(stores.definitions, stores.instances, Arc::new(FakeProvisioner::new()));

    run(Backend::Local(engine), "vpc".to_string(), "default".to_string(), Vec::new(), Vec::new()).await.unwrap();
}
