// SPDX-License-Identifier: MIT

//! The spawn engine: recursively materializes a layer and its bases,
//! applying only what changed.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use layerform_core::{LayerDefinition, LayerInstance, LayerInstanceStatus, Var};
use tracing::instrument;

use crate::error::EngineError;
use crate::workdir::{build_workdir, PathEntry};
use crate::{check_cancelled, Engine};

/// Inputs to a spawn invocation. `explicit_bindings` maps a dependency
/// *definition* name to the instance name it should be bound to, wherever
/// that dependency appears in the graph; omitted entries default to
/// `"default"`.
pub struct SpawnRequest {
    pub target_layer: String,
    pub target_instance: String,
    pub explicit_bindings: HashMap<String, String>,
    pub extra_vars: Vec<Var>,
}

struct VisitedNode {
    state_path: PathBuf,
    instance_name: String,
    /// This node's own transitive bases plus itself: `definition_name -> instance_name`.
    resolved_names: HashMap<String, String>,
    /// Same set, in bases-first materialization order.
    order: Vec<String>,
}

struct SpawnContext<'a> {
    engine: &'a Engine,
    invocation_dir: &'a Path,
    defs: HashMap<String, LayerDefinition>,
    visited: HashMap<String, VisitedNode>,
    explicit_bindings: &'a HashMap<String, String>,
    extra_vars: &'a [Var],
}

pub async fn spawn(engine: &Engine, req: SpawnRequest) -> Result<LayerInstance, EngineError> {
    if engine.instances.get(&req.target_layer, &req.target_instance).await.is_ok() {
        return Err(EngineError::AlreadyExists(format!("{}/{}", req.target_layer, req.target_instance)));
    }

    let invocation_dir = tempfile::tempdir()
        .map_err(|e| EngineError::Workdir(format!("creating scratch directory: {e}")))?;

    let mut ctx = SpawnContext {
        engine,
        invocation_dir: invocation_dir.path(),
        defs: HashMap::new(),
        visited: HashMap::new(),
        explicit_bindings: &req.explicit_bindings,
        extra_vars: &req.extra_vars,
    };

    spawn_layer(&mut ctx, &req.target_layer, &req.target_instance).await?;
    engine.instances.get(&req.target_layer, &req.target_instance).await.map_err(EngineError::from)
}

type Recursion<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

#[instrument(skip(ctx), fields(layer = %layer, instance = %instance_name))]
fn spawn_layer<'a>(ctx: &'a mut SpawnContext<'_>, layer: &'a str, instance_name: &'a str) -> Recursion<'a> {
    Box::pin(async move {
        if ctx.visited.contains_key(layer) {
            return Ok(());
        }
        check_cancelled(ctx.engine)?;

        let def = fetch_definition(ctx, layer).await?;
        let dependencies = def.dependencies.clone();
        let mut direct_bindings = HashMap::new();
        for dep in &dependencies {
            if let Some(bound) = ctx.explicit_bindings.get(dep) {
                direct_bindings.insert(dep.clone(), bound.clone());
            }
        }

        let mut dep_state_paths = Vec::new();
        let mut resolved_names = HashMap::new();
        let mut order = Vec::new();

        for dep in &dependencies {
            let dep_instance = direct_bindings.get(dep).cloned().unwrap_or_else(|| "default".to_string());
            spawn_layer(ctx, dep, &dep_instance).await?;
            let node = ctx.visited.get(dep).expect("just spawned");
            dep_state_paths.push(node.state_path.clone());
            for name in &node.order {
                if !resolved_names.contains_key(name) {
                    order.push(name.clone());
                }
            }
            resolved_names.extend(node.resolved_names.clone());
        }

        resolved_names.insert(layer.to_string(), instance_name.to_string());
        order.push(layer.to_string());

        let workdir = ctx.invocation_dir.join(layer).join(instance_name);
        let path_entries: Vec<PathEntry> = order
            .iter()
            .map(|name| PathEntry {
                definition: ctx.defs.get(name).expect("definition fetched during recursion"),
                instance_name: resolved_names.get(name).expect("resolved during recursion"),
            })
            .collect();
        build_workdir(&workdir, &path_entries).await?;

        ctx.engine.provisioner.init(&workdir, Some(&def.sha)).await?;

        let prior = ctx.engine.instances.get(layer, instance_name).await.ok();
        let state_path = workdir.join("terraform.tfstate");

        let mut sources = dep_state_paths.clone();
        if let Some(prior) = &prior {
            tokio::fs::write(&state_path, &prior.bytes)
                .await
                .map_err(|e| EngineError::Workdir(format!("writing prior state: {e}")))?;
            sources.push(state_path.clone());
        }
        compose_starting_state(ctx, &sources, &state_path).await?;

        let sha_changed = prior.as_ref().map(|p| p.definition_sha != def.sha).unwrap_or(true);
        let has_extra_vars = !ctx.extra_vars.is_empty();
        let should_apply = prior.is_none() || sha_changed || has_extra_vars;

        let mut status = LayerInstanceStatus::Alive;
        let mut apply_err = None;
        if should_apply {
            let vars = as_tf_vars(ctx.extra_vars);
            let envs = as_passthrough_envs(ctx.extra_vars);
            if let Err(e) = ctx.engine.provisioner.apply(&workdir, &vars, &[], &envs).await {
                status = LayerInstanceStatus::Faulty;
                apply_err = Some(e);
            }
        }

        let bytes = tokio::fs::read(&state_path).await.unwrap_or_default();
        let non_default_bindings: HashMap<String, String> =
            direct_bindings.into_iter().filter(|(_, v)| v != "default").collect();

        let persisted_status = if apply_err.is_some() && bytes.is_empty() {
            // No state was produced at all; nothing to persist as faulty.
            None
        } else {
            Some(status)
        };

        if let Some(status) = persisted_status {
            let instance = LayerInstance {
                definition_name: layer.to_string(),
                instance_name: instance_name.to_string(),
                definition_sha: def.sha.clone(),
                dependencies_instance: non_default_bindings,
                bytes: bytes.clone(),
                status,
                version: layerform_core::CURRENT_INSTANCE_VERSION,
            };
            ctx.engine.instances.save(instance).await?;
        }

        if let Some(err) = apply_err {
            return Err(err.into());
        }

        ctx.visited.insert(
            layer.to_string(),
            VisitedNode { state_path, instance_name: instance_name.to_string(), resolved_names, order },
        );
        Ok(())
    })
}

async fn fetch_definition<'a>(ctx: &'a mut SpawnContext<'_>, name: &str) -> Result<LayerDefinition, EngineError> {
    if let Some(def) = ctx.defs.get(name) {
        return Ok(def.clone());
    }
    let def = ctx.engine.definitions.get(name).await?;
    ctx.defs.insert(name.to_string(), def.clone());
    Ok(def)
}

async fn compose_starting_state(
    ctx: &SpawnContext<'_>,
    sources: &[PathBuf],
    dest: &Path,
) -> Result<(), EngineError> {
    match sources {
        [] => {
            tokio::fs::write(dest, b"{}")
                .await
                .map_err(|e| EngineError::Workdir(format!("writing empty state: {e}")))?;
        }
        [single] => {
            tokio::fs::copy(single, dest)
                .await
                .map_err(|e| EngineError::Workdir(format!("copying {}: {e}", single.display())))?;
        }
        [base, rest @ ..] => {
            let rest_refs: Vec<&Path> = rest.iter().map(PathBuf::as_path).collect();
            crate::merger::merge_states(ctx.engine.provisioner.as_ref(), base, &rest_refs, dest).await?;
        }
    }
    Ok(())
}

fn as_tf_vars(vars: &[Var]) -> Vec<(String, String)> {
    vars.iter()
        .filter(|v| v.is_provisioner_input())
        .map(|v| (v.name.trim_start_matches("TF_VAR_").to_string(), v.value.clone()))
        .collect()
}

/// Vars with no `TF_VAR_` prefix are plain passthrough — set in the
/// provisioner's child-process environment rather than as `-var` flags.
fn as_passthrough_envs(vars: &[Var]) -> Vec<(String, String)> {
    vars.iter()
        .filter(|v| !v.is_provisioner_input())
        .map(|v| (v.name.clone(), v.value.clone()))
        .collect()
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
