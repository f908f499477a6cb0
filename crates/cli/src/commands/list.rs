// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use layerform_core::depth;
use serde::Serialize;

use crate::config::Backend;
use crate::output::{handle_list, OutputFormat};

#[derive(Serialize)]
struct DefinitionRow {
    name: String,
    dependencies: Vec<String>,
}

#[derive(Serialize)]
struct InstanceRow {
    name: String,
    layer: String,
    dependencies: HashMap<String, String>,
    status: String,
}

pub async fn definitions(backend: Backend, format: OutputFormat) -> anyhow::Result<()> {
    let defs = match &backend {
        Backend::Local(engine) => engine.definitions.list().await?,
        Backend::Remote(client) => client.list_definitions().await?,
    };

    let edges: HashMap<String, Vec<String>> =
        defs.iter().map(|d| (d.name.clone(), d.dependencies.clone())).collect();
    let mut rows: Vec<DefinitionRow> =
        defs.into_iter().map(|d| DefinitionRow { name: d.name, dependencies: d.dependencies }).collect();
    rows.sort_by_key(|r| depth(&r.name, &edges).unwrap_or(0));

    handle_list(format, &rows, "No definitions configured.", |rows| {
        for r in rows {
            println!("{}\t{}", r.name, r.dependencies.join(","));
        }
    })
}

pub async fn instances(backend: Backend, format: OutputFormat) -> anyhow::Result<()> {
    let all = match &backend {
        Backend::Local(engine) => engine.instances.list_all().await?,
        Backend::Remote(client) => client.list_all_instances().await?,
    };

    let rows: Vec<InstanceRow> = all
        .into_iter()
        .map(|i| InstanceRow {
            name: i.instance_name,
            layer: i.definition_name,
            dependencies: i.dependencies_instance,
            status: i.status.to_string(),
        })
        .collect();

    handle_list(format, &rows, "No instances spawned.", |rows| {
        for r in rows {
            println!("{}\t{}\t{:?}\t{}", r.name, r.layer, r.dependencies, r.status);
        }
    })
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
