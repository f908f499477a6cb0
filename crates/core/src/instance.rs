// SPDX-License-Identifier: MIT

//! Layer instances: a concrete materialization of a definition, identified
//! by a user-chosen name, carrying the provisioner state for its resources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved instance name used as the implicit binding when a dependency
/// has no explicit `--base` override.
pub const DEFAULT_INSTANCE_NAME: &str = "default";

/// Current schema version for [`LayerInstance`]'s on-disk representation.
pub const CURRENT_INSTANCE_VERSION: u32 = 1;

/// Lifecycle status of a layer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerInstanceStatus {
    Spawning,
    Refreshing,
    Killing,
    Alive,
    Faulty,
}

crate::simple_display! {
    LayerInstanceStatus {
        Spawning => "spawning",
        Refreshing => "refreshing",
        Killing => "killing",
        Alive => "alive",
        Faulty => "faulty",
    }
}

/// A concrete materialization of a [`LayerDefinition`](crate::LayerDefinition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInstance {
    pub definition_name: String,
    pub instance_name: String,
    pub definition_sha: String,
    /// Non-default dependency bindings only: `dep_definition_name -> instance_name`.
    #[serde(default)]
    pub dependencies_instance: HashMap<String, String>,
    /// Opaque provisioner state JSON for this instance.
    pub bytes: Vec<u8>,
    pub status: LayerInstanceStatus,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    CURRENT_INSTANCE_VERSION
}

impl LayerInstance {
    /// Resolve the instance name this instance is bound to for dependency
    /// `dep`, defaulting to [`DEFAULT_INSTANCE_NAME`] when no explicit
    /// binding was recorded.
    pub fn dependency_instance_name(&self, dep: &str) -> &str {
        self.dependencies_instance
            .get(dep)
            .map(String::as_str)
            .unwrap_or(DEFAULT_INSTANCE_NAME)
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status, LayerInstanceStatus::Alive)
    }

    pub fn is_faulty(&self) -> bool {
        matches!(self.status, LayerInstanceStatus::Faulty)
    }
}

/// Legacy (version 0) on-disk shape, using the original tool's field names.
///
/// Readers must accept this shape and promote it to [`LayerInstance`] in
/// memory; it is never written back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInstanceV0 {
    #[serde(rename = "layerSHA")]
    pub layer_sha: String,
    #[serde(rename = "layerName")]
    pub layer_name: String,
    #[serde(rename = "stateName")]
    pub state_name: String,
    #[serde(rename = "dependenciesState", default)]
    pub dependencies_state: HashMap<String, String>,
    pub bytes: Vec<u8>,
    pub status: LayerInstanceStatus,
}

impl LayerInstanceV0 {
    pub fn into_current(self) -> LayerInstance {
        LayerInstance {
            definition_name: self.layer_name,
            instance_name: self.state_name,
            definition_sha: self.layer_sha,
            dependencies_instance: self.dependencies_state,
            bytes: self.bytes,
            status: self.status,
            version: CURRENT_INSTANCE_VERSION,
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
