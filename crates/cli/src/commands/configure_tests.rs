// SPDX-License-Identifier: MIT

use std::sync::Arc;

use layerform_adapters::{FakeProvisioner, RemoteBackendClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::config::{local_backend, Backend};

fn backend_in(dir: &std::path::Path) -> Backend {
    let stores = local_backend(dir.to_str().unwrap());
    Backend::Local(layerform_engine::Engine::new(stores.definitions, stores.instances, Arc::new(FakeProvisioner::new())))
}

fn write_file(dir: &std::path::Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn publishes_a_definition_file() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "layers/vpc.tf", "resource \"aws_vpc\" \"this\" {}\n");
    write_file(
        dir.path(),
        "definitions.json",
        r#"{ "layers": [{ "name": "vpc", "files": ["layers/vpc.tf"], "dependencies": [] }] }"#,
    );

    let backend = backend_in(dir.path());
    run(backend, &dir.path().join("definitions.json")).await.unwrap();
}

#[tokio::test]
async fn publishes_to_a_cloud_backend_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/configure"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "layers/vpc.tf", "resource \"aws_vpc\" \"this\" {}\n");
    write_file(
        dir.path(),
        "definitions.json",
        r#"{ "layers": [{ "name": "vpc", "files": ["layers/vpc.tf"], "dependencies": [] }] }"#,
    );

    let client = RemoteBackendClient::sign_in(server.uri(), "a@b.com", "hunter2").await.unwrap();
    run(Backend::Remote(client), &dir.path().join("definitions.json")).await.unwrap();
}
