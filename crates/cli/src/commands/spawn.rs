// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use layerform_core::Var;
use layerform_engine::SpawnRequest;

use crate::config::Backend;

pub async fn run(
    backend: Backend,
    layer: String,
    instance: String,
    base: Vec<(String, String)>,
    vars: Vec<Var>,
) -> anyhow::Result<()> {
    match backend {
        Backend::Local(engine) => {
            let explicit_bindings: HashMap<String, String> = base.into_iter().collect();
            let spawned = layerform_engine::spawn(
                &engine,
                SpawnRequest { target_layer: layer, target_instance: instance, explicit_bindings, extra_vars: vars },
            )
            .await?;
            println!(
                "Spawned {}/{} ({})",
                spawned.definition_name, spawned.instance_name, spawned.status
            );
            Ok(())
        }
        Backend::Remote(client) => {
            let instance = client.spawn(&layer, &instance, &vars).await?;
            println!(
                "Spawned {}/{} ({})",
                instance.definition_name, instance.instance_name, instance.status
            );
            Ok(())
        }
    }
}
