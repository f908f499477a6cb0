// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use layerform_adapters::FakeProvisioner;
use layerform_core::test_support::DefinitionBuilder;

use super::*;
use crate::test_support::{MemoryDefinitionStore, MemoryInstanceStore};

fn engine_with(defs: Vec<layerform_core::LayerDefinition>, provisioner: FakeProvisioner) -> (Engine, Arc<FakeProvisioner>) {
    let provisioner = Arc::new(provisioner);
    let engine = Engine {
        definitions: Arc::new(MemoryDefinitionStore::new(defs)),
        instances: Arc::new(MemoryInstanceStore::new(Vec::new())),
        provisioner: provisioner.clone(),
        cancel: Default::default(),
    };
    (engine, provisioner)
}

#[tokio::test]
async fn spawns_a_leaf_layer_with_no_dependencies() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let (engine, provisioner) = engine_with(vec![vpc], FakeProvisioner::new());

    let instance = spawn(
        &engine,
        SpawnRequest {
            target_layer: "vpc".to_string(),
            target_instance: "default".to_string(),
            explicit_bindings: HashMap::new(),
            extra_vars: Vec::new(),
        },
    )
    .await
    .unwrap();

    assert_eq!(instance.status, LayerInstanceStatus::Alive);
    assert_eq!(provisioner.apply_count(), 1);
}

#[tokio::test]
async fn spawning_an_existing_instance_is_rejected() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let (engine, _provisioner) = engine_with(vec![vpc], FakeProvisioner::new());

    let req = || SpawnRequest {
        target_layer: "vpc".to_string(),
        target_instance: "default".to_string(),
        explicit_bindings: HashMap::new(),
        extra_vars: Vec::new(),
    };
    spawn(&engine, req()).await.unwrap();

    let err = spawn(&engine, req()).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));
}

#[tokio::test]
async fn spawns_a_layer_and_its_base_together() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();
    let (engine, provisioner) = engine_with(vec![vpc, eks], FakeProvisioner::new());

    let instance = spawn(
        &engine,
        SpawnRequest {
            target_layer: "eks".to_string(),
            target_instance: "default".to_string(),
            explicit_bindings: HashMap::new(),
            extra_vars: Vec::new(),
        },
    )
    .await
    .unwrap();

    assert_eq!(instance.status, LayerInstanceStatus::Alive);
    // One apply for vpc, one for eks.
    assert_eq!(provisioner.apply_count(), 2);
    assert!(engine.instances.get("vpc", "default").await.is_ok());
}

#[tokio::test]
async fn spawning_with_an_explicit_base_binding_uses_that_instance_name() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();
    let (engine, _provisioner) = engine_with(vec![vpc, eks], FakeProvisioner::new());

    let mut explicit_bindings = HashMap::new();
    explicit_bindings.insert("vpc".to_string(), "prod".to_string());

    let instance = spawn(
        &engine,
        SpawnRequest {
            target_layer: "eks".to_string(),
            target_instance: "default".to_string(),
            explicit_bindings,
            extra_vars: Vec::new(),
        },
    )
    .await
    .unwrap();

    assert_eq!(instance.dependency_instance_name("vpc"), "prod");
    assert!(engine.instances.get("vpc", "prod").await.is_ok());
    assert!(engine.instances.get("vpc", "default").await.is_err());
}

#[tokio::test]
async fn a_failed_apply_persists_a_faulty_instance_and_returns_an_error() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let mut provisioner = FakeProvisioner::new();
    provisioner.fail_apply = Some("quota exceeded".to_string());
    let (engine, _provisioner) = engine_with(vec![vpc], provisioner);

    let err = spawn(
        &engine,
        SpawnRequest {
            target_layer: "vpc".to_string(),
            target_instance: "default".to_string(),
            explicit_bindings: HashMap::new(),
            extra_vars: Vec::new(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Adapter(_)));
    let persisted = engine.instances.get("vpc", "default").await.unwrap();
    assert_eq!(persisted.status, LayerInstanceStatus::Faulty);
}

#[tokio::test]
async fn a_base_with_an_unchanged_sha_and_no_extra_vars_is_not_reapplied() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();
    let (engine, provisioner) = engine_with(vec![vpc.clone(), eks], FakeProvisioner::new());

    engine
        .instances
        .save(layerform_core::test_support::InstanceBuilder::new("vpc", "default").sha(&vpc.sha).build())
        .await
        .unwrap();

    spawn(
        &engine,
        SpawnRequest {
            target_layer: "eks".to_string(),
            target_instance: "default".to_string(),
            explicit_bindings: HashMap::new(),
            extra_vars: Vec::new(),
        },
    )
    .await
    .unwrap();

    // vpc's sha matches its saved instance, so only eks gets applied.
    assert_eq!(provisioner.apply_count(), 1);
}
