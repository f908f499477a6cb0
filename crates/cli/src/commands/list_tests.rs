// SPDX-License-Identifier: MIT

use std::sync::Arc;

use layerform_adapters::{FakeProvisioner, RemoteBackendClient};
use layerform_core::test_support::{DefinitionBuilder, InstanceBuilder};
use layerform_storage::{DefinitionStore, InstanceStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::config::local_backend;

#[tokio::test]
async fn lists_definitions_in_text_mode() {
    let dir = tempfile::tempdir().unwrap();
    let stores = local_backend(dir.path().to_str().unwrap());
    stores
        .definitions
        .update(vec![DefinitionBuilder::new("vpc").build(), DefinitionBuilder::new("eks").depends_on("vpc").build()])
        .await
        .unwrap();
    let engine = layerform_engine::Engine::new(stores.definitions, stores.instances, Arc::new(FakeProvisioner::new()));

    definitions(Backend::Local(engine), OutputFormat::Text).await.unwrap();
}

#[tokio::test]
async fn lists_instances_in_json_mode() {
    let dir = tempfile::tempdir().unwrap();
    let stores = local_backend(dir.path().to_str().unwrap());
    stores.instances.save(InstanceBuilder::new("vpc", "default").build()).await.unwrap();
    let engine = layerform_engine::Engine::new(stores.definitions, stores.instances, Arc::new(FakeProvisioner::new()));

    instances(Backend::Local(engine), OutputFormat::Json).await.unwrap();
}

#[tokio::test]
async fn lists_definitions_from_a_cloud_backend() {
    let server = MockServer::start().await;
    let vpc = DefinitionBuilder::new("vpc").build();

    Mock::given(method("POST"))
        .and(path("/v1/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/definitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![vpc]))
        .mount(&server)
        .await;

    let client = RemoteBackendClient::sign_in(server.uri(), "a@b.com", "hunter2").await.unwrap();
    definitions(Backend::Remote(client), OutputFormat::Json).await.unwrap();
}

#[tokio::test]
async fn lists_instances_from_a_cloud_backend() {
    let server = MockServer::start().await;
    let kibana = InstanceBuilder::new("kibana", "a").build();

    Mock::given(method("POST"))
        .and(path("/v1/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![kibana]))
        .mount(&server)
        .await;

    let client = RemoteBackendClient::sign_in(server.uri(), "a@b.com", "hunter2").await.unwrap();
    instances(Backend::Remote(client), OutputFormat::Json).await.unwrap();
}
