// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! layerform-storage: the definition and instance stores.
//!
//! Both stores are generic over a narrow [`medium::Medium`] abstraction so
//! the local-file and object-store backends share one implementation. The
//! hosted-backend ("cloud") context bypasses these stores entirely and
//! talks to the remote API directly through `layerform-adapters`.

pub mod definitions;
pub mod error;
pub mod instances;
pub mod medium;

pub use definitions::{DefinitionStore, FileDefinitionStore};
pub use error::StorageError;
pub use instances::{FileInstanceStore, InstanceStore};
pub use medium::{LocalFileMedium, Medium, ObjectStoreMedium};
