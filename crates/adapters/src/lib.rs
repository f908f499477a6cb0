// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! layerform-adapters: everything that talks to the outside world on the
//! engine's behalf — the provisioner subprocess, HCL tag injection, and the
//! hosted-backend HTTP client.

pub mod error;
pub mod provisioner;
pub mod remote;
pub mod tags;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use error::AdapterError;
pub use provisioner::{resolve_binary, OutputValue, ProvisionerAdapter, RealProvisioner, ResourceAddress, StateTree};
pub use remote::RemoteBackendClient;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCall, FakeProvisioner};
