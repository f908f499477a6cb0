// SPDX-License-Identifier: MIT

//! Materializes a target layer plus its transitive bases into a working
//! directory, tagging resources and emitting the `lf_names` binding file.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use layerform_adapters::tags;
use layerform_core::LayerDefinition;
use tracing::instrument;

use crate::error::EngineError;

/// One layer on the materialization path, in visit order (bases before the
/// target), paired with the instance name it resolves to.
pub struct PathEntry<'a> {
    pub definition: &'a LayerDefinition,
    pub instance_name: &'a str,
}

/// Write every file in `path`'s definitions under `root`, tag `aws_*`
/// resource blocks, and emit the `lf_names` binding file. Returns `root`,
/// the common parent directory the provisioner should run in.
#[instrument(skip(path), fields(root = %root.display(), layers = path.len()))]
pub async fn build_workdir(root: &Path, path: &[PathEntry<'_>]) -> Result<PathBuf, EngineError> {
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| EngineError::Workdir(format!("creating {}: {e}", root.display())))?;

    for entry in path {
        for file in &entry.definition.files {
            let dest = root.join(&file.path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| EngineError::Workdir(format!("creating {}: {e}", parent.display())))?;
            }

            let content = if is_hcl(&file.path) {
                tags::inject_tags(&file.path, &file.content, &entry.definition.name, entry.instance_name)
                    .map_err(|e| EngineError::Workdir(e.to_string()))?
            } else {
                file.content.clone()
            };

            tokio::fs::write(&dest, content)
                .await
                .map_err(|e| EngineError::Workdir(format!("writing {}: {e}", dest.display())))?;
        }
    }

    write_lf_names(root, path).await?;
    Ok(root.to_path_buf())
}

fn is_hcl(path: &str) -> bool {
    path.ends_with(".tf")
}

async fn write_lf_names(root: &Path, path: &[PathEntry<'_>]) -> Result<(), EngineError> {
    let unix_seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| EngineError::Workdir(format!("reading system clock: {e}")))?
        .as_secs();

    let mut fields = String::new();
    let mut defaults = String::new();
    for entry in path {
        fields.push_str(&format!("    {} = string\n", entry.definition.name));
        defaults.push_str(&format!("    {} = \"{}\"\n", entry.definition.name, entry.instance_name));
    }

    let content = format!(
        "variable \"lf_names\" {{\n  type = object({{\n{fields}  }})\n  default = {{\n{defaults}  }}\n}}\n",
    );

    let dest = root.join(format!("lf_names-{unix_seconds}.tf"));
    tokio::fs::write(&dest, content)
        .await
        .map_err(|e| EngineError::Workdir(format!("writing {}: {e}", dest.display())))
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
