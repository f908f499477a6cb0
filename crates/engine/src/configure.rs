// SPDX-License-Identifier: MIT

//! Validates and publishes a batch of layer definitions from a definition
//! file, rejecting the whole batch on any failure so a store never holds a
//! half-published set.

use std::path::{Path, PathBuf};

use layerform_core::{detect_cycle, validate_name, LayerDefinition, LayerDefinitionFile};
use serde::Deserialize;
use tracing::instrument;

use crate::error::EngineError;
use crate::workdir::{build_workdir, PathEntry};
use crate::Engine;

#[derive(Debug, Deserialize)]
struct DefinitionFileLayer {
    name: String,
    files: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    layers: Vec<DefinitionFileLayer>,
}

/// Diagnostics the provisioner reported while validating one candidate
/// layer, surfaced alongside whatever other layers also failed.
#[derive(Debug, Clone)]
pub struct LayerDiagnostics {
    pub layer: String,
    pub messages: Vec<String>,
}

/// Reads a definition file and turns it into a validated, cycle-free batch
/// of [`LayerDefinition`]s, without running them through the provisioner.
/// Shared by the local `configure` path and by callers that hand the batch
/// off to a remote backend for provisioner-side validation instead.
#[instrument(fields(path = %path.display()))]
pub async fn read_definitions_file(path: &Path) -> Result<Vec<LayerDefinition>, EngineError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| EngineError::InvalidDefinition(format!("reading {}: {e}", path.display())))?;
    let doc: DefinitionFile = serde_json::from_slice(&raw)
        .map_err(|e| EngineError::InvalidDefinition(format!("parsing {}: {e}", path.display())))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut defs = Vec::new();
    for layer in &doc.layers {
        validate_name(&layer.name).map_err(|e| EngineError::InvalidDefinition(e.to_string()))?;
        let files = resolve_files(base_dir, &layer.files)?;
        defs.push(LayerDefinition::new(layer.name.clone(), files, layer.dependencies.clone()));
    }

    check_dependencies_resolve(&defs)?;

    let edges: std::collections::HashMap<String, Vec<String>> =
        defs.iter().map(|d| (d.name.clone(), d.dependencies.clone())).collect();
    detect_cycle(&edges).map_err(|e| EngineError::InvalidDefinition(e.to_string()))?;

    Ok(defs)
}

#[instrument(skip(engine), fields(path = %path.display()))]
pub async fn configure(engine: &Engine, path: &Path) -> Result<Vec<LayerDefinition>, EngineError> {
    let defs = read_definitions_file(path).await?;

    let diagnostics = validate_all(engine, &defs).await?;
    let failing: Vec<&LayerDiagnostics> = diagnostics.iter().filter(|d| !d.messages.is_empty()).collect();
    if !failing.is_empty() {
        let report = failing
            .iter()
            .map(|d| format!("{}: {}", d.layer, d.messages.join("; ")))
            .collect::<Vec<_>>()
            .join(" | ");
        return Err(EngineError::InvalidDefinition(report));
    }

    engine.definitions.update(defs.clone()).await?;
    Ok(defs)
}

fn resolve_files(base_dir: &Path, patterns: &[String]) -> Result<Vec<LayerDefinitionFile>, EngineError> {
    let mut files = Vec::new();
    for pattern in patterns {
        let full_pattern = base_dir.join(pattern);
        let matches: Vec<PathBuf> = glob::glob(&full_pattern.to_string_lossy())
            .map_err(|e| EngineError::InvalidDefinition(format!("bad glob \"{pattern}\": {e}")))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();

        if matches.is_empty() {
            return Err(EngineError::InvalidDefinition(format!("glob \"{pattern}\" matched no files")));
        }

        for path in matches {
            let content = std::fs::read(&path)
                .map_err(|e| EngineError::InvalidDefinition(format!("reading {}: {e}", path.display())))?;
            let relative = path.strip_prefix(base_dir).unwrap_or(&path).to_string_lossy().into_owned();
            files.push(LayerDefinitionFile { path: relative, content });
        }
    }
    Ok(files)
}

fn check_dependencies_resolve(defs: &[LayerDefinition]) -> Result<(), EngineError> {
    let names: std::collections::HashSet<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    for def in defs {
        for dep in &def.dependencies {
            if !names.contains(dep.as_str()) {
                return Err(EngineError::InvalidDefinition(format!(
                    "\"{}\" depends on unknown layer \"{dep}\"",
                    def.name
                )));
            }
        }
    }
    Ok(())
}

/// Materializes each candidate layer into its own scratch workdir and runs
/// `init` + `validate` concurrently, collecting diagnostics per layer.
async fn validate_all(engine: &Engine, defs: &[LayerDefinition]) -> Result<Vec<LayerDiagnostics>, EngineError> {
    let mut tasks = tokio::task::JoinSet::new();
    for def in defs {
        let def = def.clone();
        let provisioner = engine.provisioner.clone();
        tasks.spawn(async move { validate_one(provisioner.as_ref(), &def).await });
    }

    let mut out = Vec::with_capacity(defs.len());
    while let Some(result) = tasks.join_next().await {
        let result = result.map_err(|e| EngineError::Workdir(format!("validation task panicked: {e}")))?;
        out.push(result?);
    }
    Ok(out)
}

async fn validate_one(
    provisioner: &dyn layerform_adapters::ProvisionerAdapter,
    def: &LayerDefinition,
) -> Result<LayerDiagnostics, EngineError> {
    let workdir = tempfile::tempdir().map_err(|e| EngineError::Workdir(format!("creating scratch directory: {e}")))?;
    let path = [PathEntry { definition: def, instance_name: "validate" }];
    build_workdir(workdir.path(), &path).await?;

    provisioner.init(workdir.path(), None).await?;
    let messages = provisioner.validate(workdir.path()).await?;
    Ok(LayerDiagnostics { layer: def.name.clone(), messages })
}

#[cfg(test)]
#[path = "configure_tests.rs"]
mod tests;
