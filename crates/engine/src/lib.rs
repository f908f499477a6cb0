// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! layerform-engine: the spawn/kill/refresh orchestration that drives a
//! [`DefinitionStore`](layerform_storage::DefinitionStore), an
//! [`InstanceStore`](layerform_storage::InstanceStore), and a
//! [`ProvisionerAdapter`](layerform_adapters::ProvisionerAdapter) together.

use std::sync::Arc;

use layerform_adapters::ProvisionerAdapter;
use layerform_storage::{DefinitionStore, InstanceStore};
use tokio_util::sync::CancellationToken;

pub mod configure;
pub mod error;
pub mod kill;
pub mod merger;
pub mod refresh;
pub mod spawn;
pub mod workdir;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use configure::{configure, read_definitions_file, LayerDiagnostics};
pub use error::EngineError;
pub use layerform_core::{dependants_transitive, has_dependants, Dependant};
pub use kill::{kill, KillRequest};
pub use merger::merge_states;
pub use refresh::{refresh, RefreshRequest};
pub use spawn::{spawn, SpawnRequest};
pub use workdir::{build_workdir, PathEntry};

/// Bundles the stores and adapter one invocation of spawn/kill/refresh needs.
pub struct Engine {
    pub definitions: Arc<dyn DefinitionStore>,
    pub instances: Arc<dyn InstanceStore>,
    pub provisioner: Arc<dyn ProvisionerAdapter>,
    /// Cancellation signal the CLI layer wires to `Ctrl-C`/a deadline;
    /// checked at natural checkpoints between provisioner calls.
    pub cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        instances: Arc<dyn InstanceStore>,
        provisioner: Arc<dyn ProvisionerAdapter>,
    ) -> Self {
        Engine { definitions, instances, provisioner, cancel: CancellationToken::new() }
    }
}

/// Checks `engine.cancel` at a natural checkpoint between provisioner calls.
pub(crate) fn check_cancelled(engine: &Engine) -> Result<(), EngineError> {
    if engine.cancel.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}
