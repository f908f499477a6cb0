// SPDX-License-Identifier: MIT

use super::*;

fn sample() -> LayerInstance {
    LayerInstance {
        definition_name: "kibana".into(),
        instance_name: "a".into(),
        definition_sha: "abc123".into(),
        dependencies_instance: HashMap::from([("eks".to_string(), "prod".to_string())]),
        bytes: b"{}".to_vec(),
        status: LayerInstanceStatus::Alive,
        version: CURRENT_INSTANCE_VERSION,
    }
}

#[test]
fn dependency_instance_name_falls_back_to_default() {
    let instance = sample();
    assert_eq!(instance.dependency_instance_name("eks"), "prod");
    assert_eq!(instance.dependency_instance_name("vpc"), DEFAULT_INSTANCE_NAME);
}

#[test]
fn schema_round_trip_is_byte_equal() {
    let instance = sample();
    let json = serde_json::to_string(&instance).unwrap();
    let back: LayerInstance = serde_json::from_str(&json).unwrap();
    assert_eq!(instance, back);
}

#[test]
fn v0_record_promotes_to_v1() {
    let v0 = LayerInstanceV0 {
        layer_sha: "abc123".into(),
        layer_name: "kibana".into(),
        state_name: "a".into(),
        dependencies_state: HashMap::from([("eks".to_string(), "prod".to_string())]),
        bytes: b"{}".to_vec(),
        status: LayerInstanceStatus::Alive,
    };

    let promoted = v0.into_current();
    assert_eq!(promoted.definition_name, "kibana");
    assert_eq!(promoted.instance_name, "a");
    assert_eq!(promoted.definition_sha, "abc123");
    assert_eq!(promoted.version, CURRENT_INSTANCE_VERSION);
    assert_eq!(promoted.dependency_instance_name("eks"), "prod");
}

#[test]
fn is_alive_and_is_faulty_are_mutually_exclusive() {
    let mut instance = sample();
    assert!(instance.is_alive());
    assert!(!instance.is_faulty());

    instance.status = LayerInstanceStatus::Faulty;
    assert!(!instance.is_alive());
    assert!(instance.is_faulty());
}

#[test]
fn status_display_matches_original_tool_strings() {
    assert_eq!(LayerInstanceStatus::Spawning.to_string(), "spawning");
    assert_eq!(LayerInstanceStatus::Refreshing.to_string(), "refreshing");
    assert_eq!(LayerInstanceStatus::Killing.to_string(), "killing");
    assert_eq!(LayerInstanceStatus::Alive.to_string(), "alive");
    assert_eq!(LayerInstanceStatus::Faulty.to_string(), "faulty");
}
