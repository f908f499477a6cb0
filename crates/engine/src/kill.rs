// SPDX-License-Identifier: MIT

//! The kill engine: tears down an instance's uniquely-owned resources and
//! deletes its record, refusing when something still depends on it.

use std::collections::HashMap;
use std::path::Path;

use layerform_adapters::ResourceAddress;
use layerform_core::{has_dependants, LayerDefinition, Var};
use tracing::instrument;

use crate::error::EngineError;
use crate::{check_cancelled, Engine};

pub struct KillRequest {
    pub target_layer: String,
    pub target_instance: String,
    pub extra_vars: Vec<Var>,
}

#[instrument(skip(engine, req), fields(layer = %req.target_layer, instance = %req.target_instance))]
pub async fn kill(engine: &Engine, req: KillRequest) -> Result<(), EngineError> {
    let instance = engine
        .instances
        .get(&req.target_layer, &req.target_instance)
        .await
        .map_err(|_| EngineError::NotFound(format!("{}/{}", req.target_layer, req.target_instance)))?;
    check_cancelled(engine)?;

    let all = engine.instances.list_all().await?;
    let defs = definitions_by_name(engine, &all).await?;

    if has_dependants(&all, &defs, &req.target_layer, &req.target_instance) {
        let blockers: Vec<String> = all
            .iter()
            .filter(|candidate| {
                defs.get(&candidate.definition_name)
                    .map(|d| d.dependencies.iter().any(|dep| dep == &req.target_layer))
                    .unwrap_or(false)
                    && candidate.dependency_instance_name(&req.target_layer) == req.target_instance
            })
            .map(|c| format!("{}/{}", c.definition_name, c.instance_name))
            .collect();
        return Err(EngineError::HasDependants(
            format!("{}/{}", req.target_layer, req.target_instance),
            blockers,
        ));
    }

    let def = engine.definitions.get(&req.target_layer).await?;
    let workdir = tempfile::tempdir().map_err(|e| EngineError::Workdir(format!("creating scratch directory: {e}")))?;
    let state_path = workdir.path().join("terraform.tfstate");
    tokio::fs::write(&state_path, &instance.bytes)
        .await
        .map_err(|e| EngineError::Workdir(format!("writing state: {e}")))?;

    let owned = owned_addresses(engine, &def, &instance, &state_path).await?;

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

    engine.provisioner.destroy(workdir.path(), &vars, &[], &owned, &envs).await?;
    engine.instances.delete(&req.target_layer, &req.target_instance).await?;
    Ok(())
}

/// Resource addresses this instance owns and no dependency's state also
/// claims: `addresses(target) \ union(addresses(dep) for dep in bases)`.
async fn owned_addresses(
    engine: &Engine,
    def: &LayerDefinition,
    instance: &layerform_core::LayerInstance,
    state_path: &Path,
) -> Result<Vec<ResourceAddress>, EngineError> {
    let target_addrs = engine.provisioner.show_state(state_path).await?.addresses;

    let mut excluded = std::collections::HashSet::new();
    for dep in &def.dependencies {
        let dep_instance_name = instance.dependency_instance_name(dep);
        let Ok(dep_instance) = engine.instances.get(dep, dep_instance_name).await else { continue };
        let dep_workdir = tempfile::tempdir()
            .map_err(|e| EngineError::Workdir(format!("creating scratch directory: {e}")))?;
        let dep_state_path = dep_workdir.path().join("terraform.tfstate");
        tokio::fs::write(&dep_state_path, &dep_instance.bytes)
            .await
            .map_err(|e| EngineError::Workdir(format!("writing dependency state: {e}")))?;
        for addr in engine.provisioner.show_state(&dep_state_path).await?.addresses {
            excluded.insert(addr.0);
        }
    }

    Ok(target_addrs.into_iter().filter(|a| !excluded.contains(&a.0)).collect())
}

async fn definitions_by_name(
    engine: &Engine,
    instances: &[layerform_core::LayerInstance],
) -> Result<HashMap<String, LayerDefinition>, EngineError> {
    let mut defs = HashMap::new();
    for name in instances.iter().map(|i| i.definition_name.clone()).collect::<std::collections::HashSet<_>>() {
        if let Ok(def) = engine.definitions.get(&name).await {
            defs.insert(name, def);
        }
    }
    Ok(defs)
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
