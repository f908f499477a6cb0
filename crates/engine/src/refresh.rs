// SPDX-License-Identifier: MIT

//! The refresh engine: re-applies a layer's definition against its current
//! base state, unconditionally, to pick up out-of-band drift.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use layerform_core::{LayerDefinition, LayerInstance, LayerInstanceStatus, Var};
use tracing::instrument;

use crate::error::EngineError;
use crate::workdir::{build_workdir, PathEntry};
use crate::{check_cancelled, Engine};

pub struct RefreshRequest {
    pub target_layer: String,
    pub target_instance: String,
    pub extra_vars: Vec<Var>,
}

#[instrument(skip(engine, req), fields(layer = %req.target_layer, instance = %req.target_instance))]
pub async fn refresh(engine: &Engine, req: RefreshRequest) -> Result<LayerInstance, EngineError> {
    let prior = engine
        .instances
        .get(&req.target_layer, &req.target_instance)
        .await
        .map_err(|_| EngineError::NotFound(format!("{}/{}", req.target_layer, req.target_instance)))?;
    check_cancelled(engine)?;

    // Same workdir-building path as spawn: a bases-first closure over
    // `def.dependencies`, bindings resolved from the prior instance's
    // non-default dependency bindings (defaulting to "default").
    let mut defs: HashMap<String, LayerDefinition> = HashMap::new();
    let mut resolved_names: HashMap<String, String> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    resolve_base_order(
        engine,
        &req.target_layer,
        &req.target_instance,
        &prior.dependencies_instance,
        &mut defs,
        &mut resolved_names,
        &mut order,
    )
    .await?;

    let def = defs.get(&req.target_layer).expect("definition fetched during recursion").clone();
    let path_entries: Vec<PathEntry> = order
        .iter()
        .map(|name| PathEntry {
            definition: defs.get(name).expect("definition fetched during recursion"),
            instance_name: resolved_names.get(name).expect("resolved during recursion"),
        })
        .collect();

    let workdir = tempfile::tempdir().map_err(|e| EngineError::Workdir(format!("creating scratch directory: {e}")))?;
    build_workdir(workdir.path(), &path_entries).await?;
    engine.provisioner.init(workdir.path(), Some(&def.sha)).await?;

    let state_path = workdir.path().join("terraform.tfstate");
    tokio::fs::write(&state_path, &prior.bytes)
        .await
        .map_err(|e| EngineError::Workdir(format!("writing prior state: {e}")))?;

    let vars: Vec<(String, String)> = req
        .extra_vars
        .iter()
        .filter(|v| v.is_provisioner_input())
        .map(|v| (v.name.trim_start_matches("TF_VAR_").to_string(), v.value.clone()))
        .collect();
    let envs: Vec<(String, String)> = req
        .extra_vars
        .iter()
        .filter(|v| !v.is_provisioner_input())
        .map(|v| (v.name.clone(), v.value.clone()))
        .collect();

    let apply_result = engine.provisioner.apply(workdir.path(), &vars, &[], &envs).await;
    let bytes = tokio::fs::read(&state_path).await.unwrap_or(prior.bytes.clone());

    let status = if apply_result.is_ok() { LayerInstanceStatus::Alive } else { LayerInstanceStatus::Faulty };
    let instance = LayerInstance {
        definition_name: req.target_layer.clone(),
        instance_name: req.target_instance.clone(),
        definition_sha: def.sha,
        dependencies_instance: prior.dependencies_instance,
        bytes,
        status,
        version: layerform_core::CURRENT_INSTANCE_VERSION,
    };
    engine.instances.save(instance.clone()).await?;

    apply_result?;
    Ok(instance)
}

type Recursion<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

/// Walks `layer`'s transitive `dependencies`, bases first, resolving each
/// dependency's bound instance name from `bindings` (defaulting to
/// "default"). Mirrors `spawn::spawn_layer`'s closure walk, minus the
/// materialize-and-apply step: bases are assumed already alive here.
fn resolve_base_order<'a>(
    engine: &'a Engine,
    layer: &'a str,
    instance_name: &'a str,
    bindings: &'a HashMap<String, String>,
    defs: &'a mut HashMap<String, LayerDefinition>,
    resolved_names: &'a mut HashMap<String, String>,
    order: &'a mut Vec<String>,
) -> Recursion<'a> {
    Box::pin(async move {
        if resolved_names.contains_key(layer) {
            return Ok(());
        }

        let def = match defs.get(layer) {
            Some(def) => def.clone(),
            None => {
                let def = engine.definitions.get(layer).await?;
                defs.insert(layer.to_string(), def.clone());
                def
            }
        };

        for dep in &def.dependencies {
            let dep_instance = bindings.get(dep).cloned().unwrap_or_else(|| "default".to_string());
            resolve_base_order(engine, dep, &dep_instance, bindings, defs, resolved_names, order).await?;
        }

        resolved_names.insert(layer.to_string(), instance_name.to_string());
        order.push(layer.to_string());
        Ok(())
    })
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
