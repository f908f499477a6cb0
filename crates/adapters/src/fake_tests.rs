// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn init_records_the_cache_key() {
    let fake = FakeProvisioner::new();
    fake.init(Path::new("/tmp/wd"), Some("sha1")).await.unwrap();
    assert_eq!(
        fake.calls(),
        vec![FakeCall::Init { workdir: PathBuf::from("/tmp/wd"), cache_key: Some("sha1".to_string()) }]
    );
}

#[tokio::test]
async fn apply_writes_the_scripted_state_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeProvisioner::new();

    fake.apply(dir.path(), &[], &[], &[]).await.unwrap();
    assert_eq!(fake.apply_count(), 1);

    let written = tokio::fs::read(dir.path().join("terraform.tfstate")).await.unwrap();
    assert_eq!(written, fake.apply_state);
}

#[tokio::test]
async fn apply_can_be_scripted_to_fail_after_writing_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut fake = FakeProvisioner::new();
    fake.fail_apply = Some("quota exceeded".to_string());

    let err = fake.apply(dir.path(), &[], &[], &[]).await.unwrap_err();
    assert!(matches!(err, AdapterError::ProvisionerFailed { .. }));
    assert!(dir.path().join("terraform.tfstate").exists());
}

#[tokio::test]
async fn destroy_records_target_addresses() {
    let fake = FakeProvisioner::new();
    let targets = vec![ResourceAddress("aws_vpc.this".to_string())];
    fake.destroy(Path::new("/tmp/wd"), &[], &[], &targets, &[]).await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![FakeCall::Destroy { workdir: PathBuf::from("/tmp/wd"), targets: vec!["aws_vpc.this".to_string()] }]
    );
}
