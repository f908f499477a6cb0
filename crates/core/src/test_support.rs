// SPDX-License-Identifier: MIT

//! Builders shared by this crate's own tests and, via the `test-support`
//! feature, by downstream crates' tests. Keeps fixture construction out of
//! individual test modules so storage/adapters/engine tests can build
//! definitions and instances without duplicating field lists.

use std::collections::HashMap;

use crate::definition::{LayerDefinition, LayerDefinitionFile};
use crate::instance::{LayerInstance, LayerInstanceStatus, CURRENT_INSTANCE_VERSION};

/// Builds a [`LayerDefinition`] with sensible defaults, overridable per field.
pub struct DefinitionBuilder {
    name: String,
    files: Vec<LayerDefinitionFile>,
    dependencies: Vec<String>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        DefinitionBuilder {
            name: name.into(),
            files: vec![LayerDefinitionFile {
                path: "main.tf".to_string(),
                content: b"# empty\n".to_vec(),
            }],
            dependencies: Vec::new(),
        }
    }

    pub fn file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.push(LayerDefinitionFile { path: path.into(), content: content.into() });
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn build(self) -> LayerDefinition {
        LayerDefinition::new(self.name, self.files, self.dependencies)
    }
}

/// Builds a [`LayerInstance`] with sensible defaults, overridable per field.
pub struct InstanceBuilder {
    definition_name: String,
    instance_name: String,
    definition_sha: String,
    dependencies_instance: HashMap<String, String>,
    bytes: Vec<u8>,
    status: LayerInstanceStatus,
}

impl InstanceBuilder {
    pub fn new(definition_name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        InstanceBuilder {
            definition_name: definition_name.into(),
            instance_name: instance_name.into(),
            definition_sha: "0".repeat(40),
            dependencies_instance: HashMap::new(),
            bytes: b"{}".to_vec(),
            status: LayerInstanceStatus::Alive,
        }
    }

    pub fn sha(mut self, sha: impl Into<String>) -> Self {
        self.definition_sha = sha.into();
        self
    }

    pub fn bound_to(mut self, dependency: impl Into<String>, instance_name: impl Into<String>) -> Self {
        self.dependencies_instance.insert(dependency.into(), instance_name.into());
        self
    }

    pub fn status(mut self, status: LayerInstanceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> LayerInstance {
        LayerInstance {
            definition_name: self.definition_name,
            instance_name: self.instance_name,
            definition_sha: self.definition_sha,
            dependencies_instance: self.dependencies_instance,
            bytes: self.bytes,
            status: self.status,
            version: CURRENT_INSTANCE_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_builder_stamps_a_valid_sha() {
        let def = DefinitionBuilder::new("vpc").build();
        assert!(def.sha_matches_content());
    }

    #[test]
    fn instance_builder_resolves_explicit_binding() {
        let instance = InstanceBuilder::new("kibana", "a").bound_to("eks", "prod").build();
        assert_eq!(instance.dependency_instance_name("eks"), "prod");
    }
}
