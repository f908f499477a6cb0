// SPDX-License-Identifier: MIT

//! A scripted [`ProvisionerAdapter`] for exercising the engine without
//! shelling out to a real provisioner binary.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::provisioner::{OutputValue, ProvisionerAdapter, ResourceAddress, StateTree};

/// One recorded call into the fake adapter, for assertions in engine tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Init { workdir: PathBuf, cache_key: Option<String> },
    Apply { workdir: PathBuf },
    Destroy { workdir: PathBuf, targets: Vec<String> },
    StateMv { src: PathBuf, dst: PathBuf, addr: String },
}

/// Scripts what the fake adapter does on `apply`/`destroy`, and records
/// every call it receives.
pub struct FakeProvisioner {
    calls: Mutex<Vec<FakeCall>>,
    /// Bytes written to `terraform.tfstate` in the workdir after a
    /// successful `apply`. Defaults to an empty JSON state.
    pub apply_state: Vec<u8>,
    /// Resource addresses `show_state` reports for a path with no entry in
    /// `addresses_by_path`.
    pub addresses: Vec<String>,
    /// Per-path overrides for `show_state`, for tests that need different
    /// state files to report different resources.
    pub addresses_by_path: Mutex<HashMap<PathBuf, Vec<String>>>,
    /// When set, `apply` fails with this message after writing `apply_state`
    /// to the workdir first (so faulty-instance persistence can be tested).
    pub fail_apply: Option<String>,
    /// When set, `destroy` fails with this message.
    pub fail_destroy: Option<String>,
    /// Diagnostics `validate` reports for any workdir. Empty means clean.
    pub validate_diagnostics: Vec<String>,
    /// Relative file paths found under the workdir at the moment of each
    /// `apply` call, in call order. Captured synchronously since the
    /// caller's scratch directory is often gone by the time a test gets to
    /// inspect it.
    apply_workdir_files: Mutex<Vec<Vec<String>>>,
}

impl Default for FakeProvisioner {
    fn default() -> Self {
        FakeProvisioner {
            calls: Mutex::new(Vec::new()),
            apply_state: b"{\"resources\":[]}".to_vec(),
            addresses: Vec::new(),
            addresses_by_path: Mutex::new(HashMap::new()),
            fail_apply: None,
            fail_destroy: None,
            validate_diagnostics: Vec::new(),
            apply_workdir_files: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn apply_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, FakeCall::Apply { .. })).count()
    }

    /// Script `show_state(path)` to report `addresses` regardless of the
    /// top-level `addresses` field.
    pub fn set_addresses_for(&self, path: impl Into<PathBuf>, addresses: Vec<String>) {
        self.addresses_by_path.lock().unwrap_or_else(|e| e.into_inner()).insert(path.into(), addresses);
    }

    /// The relative file paths seen under the workdir for the most recent
    /// `apply` call, or `None` if `apply` was never called.
    pub fn last_apply_workdir_files(&self) -> Option<Vec<String>> {
        self.apply_workdir_files.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }

    fn record(&self, call: FakeCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    fn snapshot_workdir(workdir: &Path) -> Vec<String> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
            let Ok(entries) = std::fs::read_dir(dir) else { return };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else if let Ok(rel) = path.strip_prefix(root) {
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        let mut files = Vec::new();
        walk(workdir, workdir, &mut files);
        files.sort();
        files
    }
}

#[async_trait]
impl ProvisionerAdapter for FakeProvisioner {
    async fn init(&self, workdir: &Path, cache_key: Option<&str>) -> Result<(), AdapterError> {
        self.record(FakeCall::Init {
            workdir: workdir.to_path_buf(),
            cache_key: cache_key.map(str::to_string),
        });
        Ok(())
    }

    async fn apply(
        &self,
        workdir: &Path,
        _vars: &[(String, String)],
        _var_files: &[PathBuf],
        _envs: &[(String, String)],
    ) -> Result<(), AdapterError> {
        self.record(FakeCall::Apply { workdir: workdir.to_path_buf() });
        self.apply_workdir_files.lock().unwrap_or_else(|e| e.into_inner()).push(Self::snapshot_workdir(workdir));

        tokio::fs::write(workdir.join("terraform.tfstate"), &self.apply_state)
            .await
            .map_err(|source| AdapterError::Io { context: "fake apply writing state".into(), source })?;

        if let Some(stderr) = &self.fail_apply {
            return Err(AdapterError::ProvisionerFailed { op: "apply", status: 1, stderr: stderr.clone() });
        }
        Ok(())
    }

    async fn destroy(
        &self,
        workdir: &Path,
        _vars: &[(String, String)],
        _var_files: &[PathBuf],
        targets: &[ResourceAddress],
        _envs: &[(String, String)],
    ) -> Result<(), AdapterError> {
        self.record(FakeCall::Destroy {
            workdir: workdir.to_path_buf(),
            targets: targets.iter().map(|a| a.0.clone()).collect(),
        });

        if let Some(stderr) = &self.fail_destroy {
            return Err(AdapterError::ProvisionerFailed { op: "destroy", status: 1, stderr: stderr.clone() });
        }
        Ok(())
    }

    async fn show_state(&self, path: &Path) -> Result<StateTree, AdapterError> {
        let by_path = self.addresses_by_path.lock().unwrap_or_else(|e| e.into_inner());
        let addresses = by_path.get(path).cloned().unwrap_or_else(|| self.addresses.clone());
        Ok(StateTree { addresses: addresses.into_iter().map(ResourceAddress).collect() })
    }

    async fn state_mv(&self, src: &Path, dst: &Path, addr: &ResourceAddress) -> Result<(), AdapterError> {
        self.record(FakeCall::StateMv {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            addr: addr.0.clone(),
        });
        Ok(())
    }

    async fn output(&self, _workdir: &Path) -> Result<BTreeMap<String, OutputValue>, AdapterError> {
        Ok(BTreeMap::new())
    }

    async fn validate(&self, _workdir: &Path) -> Result<Vec<String>, AdapterError> {
        Ok(self.validate_diagnostics.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
