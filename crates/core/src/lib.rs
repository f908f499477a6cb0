// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! layerform-core: domain model for the layer spawn/kill/refresh engine.
//!
//! This crate owns the data that is persisted and exchanged across every
//! other crate in the workspace: layer definitions, layer instances, the
//! dependency-graph algorithms that walk them, and the error taxonomy that
//! every backend and adapter maps its own errors onto.

pub mod macros;

pub mod definition;
pub mod dependency;
pub mod error;
pub mod instance;
pub mod name;
pub mod var;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use definition::{LayerDefinition, LayerDefinitionFile};
pub use dependency::{dependants_transitive, depth, detect_cycle, has_dependants, CycleError, Dependant};
pub use error::CoreError;
pub use instance::{
    LayerInstance, LayerInstanceStatus, LayerInstanceV0, CURRENT_INSTANCE_VERSION,
    DEFAULT_INSTANCE_NAME,
};
pub use name::{validate_name, InvalidName};
pub use var::Var;
