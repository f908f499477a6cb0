// SPDX-License-Identifier: MIT

use std::sync::Arc;

use layerform_adapters::FakeProvisioner;
use layerform_core::test_support::{DefinitionBuilder, InstanceBuilder};

use super::*;
use crate::test_support::{MemoryDefinitionStore, MemoryInstanceStore};

fn engine_with(
    defs: Vec<layerform_core::LayerDefinition>,
    provisioner: FakeProvisioner,
) -> (Engine, Arc<FakeProvisioner>) {
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
async fn refuses_to_kill_an_instance_with_dependants() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();
    let (engine, _provisioner) = engine_with(vec![vpc, eks], FakeProvisioner::new());

    engine.instances.save(InstanceBuilder::new("vpc", "default").build()).await.unwrap();
    engine.instances.save(InstanceBuilder::new("eks", "default").build()).await.unwrap();

    let err = kill(
        &engine,
        KillRequest { target_layer: "vpc".to_string(), target_instance: "default".to_string(), extra_vars: Vec::new() },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::HasDependants(_, ref blockers) if blockers == &vec!["eks/default".to_string()]));
}

#[tokio::test]
async fn kills_a_leaf_instance_and_deletes_its_record() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let mut provisioner = FakeProvisioner::new();
    provisioner.addresses = vec!["aws_vpc.this".to_string()];
    let (engine, provisioner) = engine_with(vec![vpc], provisioner);

    engine.instances.save(InstanceBuilder::new("vpc", "default").build()).await.unwrap();

    kill(
        &engine,
        KillRequest { target_layer: "vpc".to_string(), target_instance: "default".to_string(), extra_vars: Vec::new() },
    )
    .await
    .unwrap();

    assert!(engine.instances.get("vpc", "default").await.is_err());
    assert!(provisioner.calls().iter().any(|c| matches!(
        c,
        layerform_adapters::FakeCall::Destroy { targets, .. } if targets == &vec!["aws_vpc.this".to_string()]
    )));
}

#[tokio::test]
async fn propagates_destroy_failure_without_deleting_the_record() {
    let vpc = DefinitionBuilder::new("vpc").build();
    let mut provisioner = FakeProvisioner::new();
    provisioner.fail_destroy = Some("dependency violation".to_string());
    let (engine, _provisioner) = engine_with(vec![vpc], provisioner);

    engine.instances.save(InstanceBuilder::new("vpc", "default").build()).await.unwrap();

    let err = kill(
        &engine,
        KillRequest { target_layer: "vpc".to_string(), target_instance: "default".to_string(), extra_vars: Vec::new() },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Adapter(_)));
    assert!(engine.instances.get("vpc", "default").await.is_ok());
}
