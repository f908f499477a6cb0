// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn not_found_maps_to_core_not_found() {
    let err = StorageError::NotFound("vpc".to_string());
    assert_eq!(err.kind(), "not_found");
    assert!(matches!(CoreError::from(err), CoreError::NotFound(_)));
}

#[test]
fn schema_too_new_maps_to_core_schema_too_new() {
    let err = StorageError::SchemaTooNew { found: 7, current: 1 };
    assert_eq!(err.kind(), "schema_too_new");
    assert!(matches!(
        CoreError::from(err),
        CoreError::SchemaTooNew { found: 7, current: 1 }
    ));
}

#[test]
fn decode_errors_map_to_store_unavailable() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = StorageError::Decode { location: "defs.json".to_string(), source: parse_err };
    assert_eq!(err.kind(), "store_unavailable");
    assert!(matches!(CoreError::from(err), CoreError::StoreUnavailable(_)));
}
