// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn has_dependants_lists_the_blocking_instances_in_the_message() {
    let err = EngineError::HasDependants("vpc/default".to_string(), vec!["eks/default".to_string()]);
    assert!(err.to_string().contains("eks/default"));
    assert_eq!(err.kind(), "has_dependants");
}

#[test]
fn storage_not_found_propagates_its_kind() {
    let err = EngineError::from(StorageError::NotFound("vpc".to_string()));
    assert_eq!(err.kind(), "not_found");
    assert!(matches!(CoreError::from(err), CoreError::NotFound(_)));
}
