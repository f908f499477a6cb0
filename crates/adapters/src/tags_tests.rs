// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn untagged_file_is_returned_unchanged() {
    let content = b"resource \"random_id\" \"suffix\" {\n  byte_length = 4\n}\n";
    let out = inject_tags("main.tf", content, "vpc", "default").unwrap();
    assert_eq!(out, content);
}

#[test]
fn resource_without_tags_gets_a_tags_attribute() {
    let content = b"resource \"aws_vpc\" \"this\" {\n  cidr_block = \"10.0.0.0/16\"\n}\n";
    let out = inject_tags("main.tf", content, "vpc", "default").unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("layerform_layer_name"));
    assert!(text.contains("layerform_layer_instance"));
    assert!(text.contains("\"vpc\""));
    assert!(text.contains("\"default\""));
}

#[test]
fn resource_with_existing_tags_gets_a_merge_call() {
    let content = br#"resource "aws_vpc" "this" {
  cidr_block = "10.0.0.0/16"
  tags = { owner = "platform" }
}
"#;
    let out = inject_tags("main.tf", content, "vpc", "staging").unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("merge("));
    assert!(text.contains("owner"));
}

#[test]
fn non_aws_resource_blocks_are_left_verbatim() {
    let content = b"resource \"google_compute_instance\" \"this\" {\n  name = \"x\"\n}\n";
    let out = inject_tags("main.tf", content, "vpc", "default").unwrap();
    assert_eq!(out, content);
}
