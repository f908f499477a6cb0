// SPDX-License-Identifier: MIT

use layerform_core::test_support::InstanceBuilder;
use layerform_core::LayerInstanceStatus;

use super::*;
use crate::medium::LocalFileMedium;

fn store(dir: &tempfile::TempDir) -> FileInstanceStore<LocalFileMedium> {
    FileInstanceStore::new(LocalFileMedium::new(dir.path().join("instances.json")))
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let instance = InstanceBuilder::new("kibana", "a").build();

    store.save(instance.clone()).await.unwrap();
    assert_eq!(store.get("kibana", "a").await.unwrap(), instance);
}

#[tokio::test]
async fn save_is_an_upsert_keyed_by_layer_and_instance() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    store.save(InstanceBuilder::new("kibana", "a").status(LayerInstanceStatus::Spawning).build())
        .await
        .unwrap();
    store.save(InstanceBuilder::new("kibana", "a").status(LayerInstanceStatus::Alive).build())
        .await
        .unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].is_alive());
}

#[tokio::test]
async fn get_missing_instance_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let err = store.get("kibana", "a").await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn list_by_layer_filters_other_layers() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    store.save(InstanceBuilder::new("kibana", "a").build()).await.unwrap();
    store.save(InstanceBuilder::new("kibana", "b").build()).await.unwrap();
    store.save(InstanceBuilder::new("grafana", "a").build()).await.unwrap();

    let kibana = store.list_by_layer("kibana").await.unwrap();
    assert_eq!(kibana.len(), 2);
}

#[tokio::test]
async fn delete_removes_the_instance() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.save(InstanceBuilder::new("kibana", "a").build()).await.unwrap();

    store.delete("kibana", "a").await.unwrap();
    assert!(store.get("kibana", "a").await.is_err());
}

#[tokio::test]
async fn delete_missing_instance_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let err = store.delete("kibana", "a").await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn version_zero_document_migrates_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("instances.json");
    tokio::fs::write(
        &path,
        serde_json::json!({
            "version": 0,
            "states": [{
                "layerSHA": "abc123",
                "layerName": "kibana",
                "stateName": "a",
                "dependenciesState": {"eks": "prod"},
                "bytes": [],
                "status": "alive",
            }],
        })
        .to_string(),
    )
    .await
    .unwrap();

    let store = FileInstanceStore::new(LocalFileMedium::new(path));
    let instance = store.get("kibana", "a").await.unwrap();
    assert_eq!(instance.version, CURRENT_INSTANCE_VERSION);
    assert_eq!(instance.dependency_instance_name("eks"), "prod");
}

#[tokio::test]
async fn document_from_a_newer_release_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("instances.json");
    tokio::fs::write(&path, serde_json::json!({"version": 7, "instances": []}).to_string())
        .await
        .unwrap();

    let store = FileInstanceStore::new(LocalFileMedium::new(path));
    let err = store.list_all().await.unwrap_err();
    assert!(matches!(err, StorageError::SchemaTooNew { found: 7, current: 1 }));
}
