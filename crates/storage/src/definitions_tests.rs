// SPDX-License-Identifier: MIT

use layerform_core::test_support::DefinitionBuilder;

use super::*;
use crate::medium::LocalFileMedium;

fn store(dir: &tempfile::TempDir) -> FileDefinitionStore<LocalFileMedium> {
    FileDefinitionStore::new(LocalFileMedium::new(dir.path().join("definitions.json")))
}

#[tokio::test]
async fn list_on_a_fresh_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let vpc = DefinitionBuilder::new("vpc").build();

    store.update(vec![vpc.clone()]).await.unwrap();
    assert_eq!(store.get("vpc").await.unwrap(), vpc);
}

#[tokio::test]
async fn get_missing_definition_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let err = store.get("vpc").await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn update_replaces_the_whole_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    store.update(vec![DefinitionBuilder::new("vpc").build()]).await.unwrap();
    store.update(vec![DefinitionBuilder::new("eks").build()]).await.unwrap();

    let names: Vec<String> = store.list().await.unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["eks".to_string()]);
}

#[tokio::test]
async fn resolve_deps_returns_transitive_closure_in_discovery_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();
    let kibana = DefinitionBuilder::new("kibana").depends_on("eks").build();

    store.update(vec![vpc.clone(), eks.clone(), kibana.clone()]).await.unwrap();

    let deps = store.resolve_deps(&kibana).await.unwrap();
    let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["eks", "vpc"]);
}

#[tokio::test]
async fn resolve_deps_on_missing_dependency_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let kibana = DefinitionBuilder::new("kibana").depends_on("eks").build();
    store.update(vec![kibana.clone()]).await.unwrap();

    let err = store.resolve_deps(&kibana).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}
