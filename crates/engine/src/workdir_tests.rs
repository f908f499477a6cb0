// SPDX-License-Identifier: MIT

use layerform_core::test_support::DefinitionBuilder;

use super::*;

#[tokio::test]
async fn writes_every_file_at_its_relative_path() {
    let dir = tempfile::tempdir().unwrap();
    let vpc = DefinitionBuilder::new("vpc").file("nested/extra.tf", b"# extra\n".to_vec()).build();

    build_workdir(dir.path(), &[PathEntry { definition: &vpc, instance_name: "default" }])
        .await
        .unwrap();

    assert!(dir.path().join("main.tf").exists());
    assert!(dir.path().join("nested/extra.tf").exists());
}

#[tokio::test]
async fn tags_resource_blocks_in_tf_files() {
    let dir = tempfile::tempdir().unwrap();
    let vpc = DefinitionBuilder::new("vpc")
        .file("main.tf", b"resource \"aws_vpc\" \"this\" {\n  cidr_block = \"10.0.0.0/16\"\n}\n".to_vec())
        .build();

    build_workdir(dir.path(), &[PathEntry { definition: &vpc, instance_name: "default" }])
        .await
        .unwrap();

    let written = tokio::fs::read_to_string(dir.path().join("main.tf")).await.unwrap();
    assert!(written.contains("layerform_layer_name"));
}

#[tokio::test]
async fn emits_an_lf_names_file_with_one_field_per_layer() {
    let dir = tempfile::tempdir().unwrap();
    let vpc = DefinitionBuilder::new("vpc").build();
    let eks = DefinitionBuilder::new("eks").depends_on("vpc").build();

    build_workdir(
        dir.path(),
        &[
            PathEntry { definition: &vpc, instance_name: "default" },
            PathEntry { definition: &eks, instance_name: "prod" },
        ],
    )
    .await
    .unwrap();

    let mut saw_lf_names = false;
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("lf_names-") {
            saw_lf_names = true;
            let content = tokio::fs::read_to_string(entry.path()).await.unwrap();
            assert!(content.contains("vpc = \"default\""));
            assert!(content.contains("eks = \"prod\""));
        }
    }
    assert!(saw_lf_names);
}

#[tokio::test]
async fn non_tf_files_are_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let vpc = DefinitionBuilder::new("vpc").file("README.md", b"# notes\n".to_vec()).build();

    build_workdir(dir.path(), &[PathEntry { definition: &vpc, instance_name: "default" }])
        .await
        .unwrap();

    let written = tokio::fs::read(dir.path().join("README.md")).await.unwrap();
    assert_eq!(written, b"# notes\n");
}
