// SPDX-License-Identifier: MIT

//! The provisioner adapter: everything that shells out to the external
//! infrastructure provisioner binary (Terraform-compatible CLI).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::instrument;

use crate::error::AdapterError;

/// A single declared output value, as produced by `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    pub value: serde_json::Value,
    #[serde(rename = "type")]
    pub value_type: serde_json::Value,
    #[serde(default)]
    pub sensitive: bool,
}

/// A resource address within one state file, e.g. `module.eks.aws_eks_cluster.this`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceAddress(pub String);

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed state file: every resource address reachable by a depth-first
/// walk of the root module and its children.
#[derive(Debug, Clone, Default)]
pub struct StateTree {
    pub addresses: Vec<ResourceAddress>,
}

#[async_trait]
pub trait ProvisionerAdapter: Send + Sync {
    async fn init(&self, workdir: &Path, cache_key: Option<&str>) -> Result<(), AdapterError>;

    async fn apply(
        &self,
        workdir: &Path,
        vars: &[(String, String)],
        var_files: &[PathBuf],
        envs: &[(String, String)],
    ) -> Result<(), AdapterError>;

    async fn destroy(
        &self,
        workdir: &Path,
        vars: &[(String, String)],
        var_files: &[PathBuf],
        targets: &[ResourceAddress],
        envs: &[(String, String)],
    ) -> Result<(), AdapterError>;

    async fn show_state(&self, path: &Path) -> Result<StateTree, AdapterError>;

    async fn state_mv(&self, src: &Path, dst: &Path, addr: &ResourceAddress) -> Result<(), AdapterError>;

    async fn output(&self, workdir: &Path) -> Result<BTreeMap<String, OutputValue>, AdapterError>;

    async fn validate(&self, workdir: &Path) -> Result<Vec<String>, AdapterError>;
}

/// Resolves the provisioner binary once per adapter instance: an explicit
/// path, then the `LF_TF_PATH` environment override, then `terraform` (or
/// `LF_TF_BINARY_NAME`) on `PATH`.
pub fn resolve_binary(explicit: Option<&Path>) -> Result<PathBuf, AdapterError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("LF_TF_PATH") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let name = std::env::var("LF_TF_BINARY_NAME").unwrap_or_else(|_| "terraform".to_string());
    which::which(&name).map_err(|_| AdapterError::ProvisionerNotFound(name))
}

/// The real [`ProvisionerAdapter`], shelling out to the resolved binary.
pub struct RealProvisioner {
    binary: PathBuf,
    cache_root: Option<PathBuf>,
}

impl RealProvisioner {
    pub fn new(explicit_binary: Option<PathBuf>) -> Result<Self, AdapterError> {
        let binary = resolve_binary(explicit_binary.as_deref())?;
        let cache_root = dirs::cache_dir().map(|d| d.join("layerform").join("tf-init-cache"));
        Ok(RealProvisioner { binary, cache_root })
    }

    fn command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(workdir);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    async fn run(&self, op: &'static str, mut cmd: Command) -> Result<Vec<u8>, AdapterError> {
        let output = cmd.output().await.map_err(AdapterError::Spawn)?;
        if !output.status.success() {
            return Err(AdapterError::ProvisionerFailed {
                op,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output.stdout)
    }

    /// Path in the per-user init cache for a definition fingerprint.
    fn cache_entry(&self, cache_key: &str) -> Option<PathBuf> {
        self.cache_root.as_ref().map(|root| root.join(cache_key))
    }

    async fn restore_from_cache(&self, workdir: &Path, entry: &Path) -> Result<bool, AdapterError> {
        let cached_module = entry.join(".terraform");
        let cached_lock = entry.join(".terraform.lock.hcl");
        if !cached_module.is_dir() {
            return Ok(false);
        }

        copy_dir_recursive(&cached_module, &workdir.join(".terraform")).await?;
        if cached_lock.is_file() {
            tokio::fs::copy(&cached_lock, workdir.join(".terraform.lock.hcl"))
                .await
                .map_err(|source| AdapterError::Io { context: "restoring init cache lock file".into(), source })?;
        }
        Ok(true)
    }

    async fn populate_cache(&self, workdir: &Path, entry: &Path) -> Result<(), AdapterError> {
        let tmp = entry.with_extension("tmp");
        tokio::fs::create_dir_all(&tmp)
            .await
            .map_err(|source| AdapterError::Io { context: "creating init cache scratch dir".into(), source })?;

        copy_dir_recursive(&workdir.join(".terraform"), &tmp.join(".terraform")).await?;
        let lock = workdir.join(".terraform.lock.hcl");
        if lock.is_file() {
            tokio::fs::copy(&lock, tmp.join(".terraform.lock.hcl"))
                .await
                .map_err(|source| AdapterError::Io { context: "populating init cache lock file".into(), source })?;
        }

        // Fingerprinted keys make concurrent writers produce identical
        // content, so a rename-into-place keeps readers from seeing a
        // torn cache entry without needing a lock.
        let _ = tokio::fs::remove_dir_all(entry).await;
        tokio::fs::rename(&tmp, entry)
            .await
            .map_err(|source| AdapterError::Io { context: "publishing init cache entry".into(), source })
    }
}

#[async_trait]
impl ProvisionerAdapter for RealProvisioner {
    #[instrument(skip(self), fields(workdir = %workdir.display()))]
    async fn init(&self, workdir: &Path, cache_key: Option<&str>) -> Result<(), AdapterError> {
        if let (Some(key), Some(root)) = (cache_key, &self.cache_root) {
            let entry = root.join(key);
            if self.restore_from_cache(workdir, &entry).await? {
                return Ok(());
            }

            let mut cmd = self.command(workdir);
            cmd.arg("init").arg("-input=false");
            self.run("init", cmd).await?;

            self.populate_cache(workdir, &entry).await?;
            return Ok(());
        }

        let mut cmd = self.command(workdir);
        cmd.arg("init").arg("-input=false");
        self.run("init", cmd).await?;
        Ok(())
    }

    #[instrument(skip(self, vars, var_files, envs), fields(workdir = %workdir.display()))]
    async fn apply(
        &self,
        workdir: &Path,
        vars: &[(String, String)],
        var_files: &[PathBuf],
        envs: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let mut cmd = self.command(workdir);
        cmd.arg("apply").arg("-input=false").arg("-auto-approve");
        for (k, v) in vars {
            cmd.arg("-var").arg(format!("{k}={v}"));
        }
        for f in var_files {
            cmd.arg("-var-file").arg(f);
        }
        cmd.envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.run("apply", cmd).await?;
        Ok(())
    }

    #[instrument(skip(self, vars, var_files, targets, envs), fields(workdir = %workdir.display(), targets = targets.len()))]
    async fn destroy(
        &self,
        workdir: &Path,
        vars: &[(String, String)],
        var_files: &[PathBuf],
        targets: &[ResourceAddress],
        envs: &[(String, String)],
    ) -> Result<(), AdapterError> {
        let mut cmd = self.command(workdir);
        cmd.arg("destroy").arg("-input=false").arg("-auto-approve");
        for (k, v) in vars {
            cmd.arg("-var").arg(format!("{k}={v}"));
        }
        for f in var_files {
            cmd.arg("-var-file").arg(f);
        }
        for addr in targets {
            cmd.arg("-target").arg(&addr.0);
        }
        cmd.envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.run("destroy", cmd).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn show_state(&self, path: &Path) -> Result<StateTree, AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("show").arg("-json").arg(path);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let stdout = self.run("show", cmd).await?;

        let value: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|source| AdapterError::Decode { context: "terraform show -json".into(), source })?;

        let mut addresses = Vec::new();
        collect_addresses(value.get("values").and_then(|v| v.get("root_module")), &mut addresses);
        Ok(StateTree { addresses })
    }

    #[instrument(skip(self), fields(src = %src.display(), dst = %dst.display(), addr = %addr.0))]
    async fn state_mv(&self, src: &Path, dst: &Path, addr: &ResourceAddress) -> Result<(), AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("state")
            .arg("mv")
            .arg(format!("-state={}", src.display()))
            .arg(format!("-state-out={}", dst.display()))
            .arg(&addr.0)
            .arg(&addr.0);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        self.run("state mv", cmd).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(workdir = %workdir.display()))]
    async fn output(&self, workdir: &Path) -> Result<BTreeMap<String, OutputValue>, AdapterError> {
        let mut cmd = self.command(workdir);
        cmd.arg("output").arg("-json");
        let stdout = self.run("output", cmd).await?;
        serde_json::from_slice(&stdout)
            .map_err(|source| AdapterError::Decode { context: "terraform output -json".into(), source })
    }

    #[instrument(skip(self), fields(workdir = %workdir.display()))]
    async fn validate(&self, workdir: &Path) -> Result<Vec<String>, AdapterError> {
        let mut cmd = self.command(workdir);
        cmd.arg("validate").arg("-json");
        let output = cmd.output().await.map_err(AdapterError::Spawn)?;

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|source| AdapterError::Decode { context: "terraform validate -json".into(), source })?;

        let diagnostics = value
            .get("diagnostics")
            .and_then(serde_json::Value::as_array)
            .map(|diags| {
                diags
                    .iter()
                    .filter_map(|d| d.get("summary").and_then(serde_json::Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(diagnostics)
    }
}

fn collect_addresses(module: Option<&serde_json::Value>, out: &mut Vec<ResourceAddress>) {
    let Some(module) = module else { return };

    if let Some(resources) = module.get("resources").and_then(serde_json::Value::as_array) {
        for r in resources {
            if let Some(addr) = r.get("address").and_then(serde_json::Value::as_str) {
                out.push(ResourceAddress(addr.to_string()));
            }
        }
    }

    if let Some(children) = module.get("child_modules").and_then(serde_json::Value::as_array) {
        for child in children {
            collect_addresses(Some(child), out);
        }
    }
}

async fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), AdapterError> {
    tokio::fs::create_dir_all(dst)
        .await
        .map_err(|source| AdapterError::Io { context: format!("creating {}", dst.display()), source })?;

    let mut entries = tokio::fs::read_dir(src)
        .await
        .map_err(|source| AdapterError::Io { context: format!("reading {}", src.display()), source })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| AdapterError::Io { context: format!("reading {}", src.display()), source })?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|source| AdapterError::Io { context: format!("stat {}", entry.path().display()), source })?;
        let dest_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            Box::pin(copy_dir_recursive(&entry.path(), &dest_path)).await?;
        } else {
            tokio::fs::copy(entry.path(), &dest_path)
                .await
                .map_err(|source| AdapterError::Io { context: format!("copying to {}", dest_path.display()), source })?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
