// SPDX-License-Identifier: MIT

use layerform_core::Var;
use layerform_engine::RefreshRequest;

use crate::config::Backend;

pub async fn run(backend: Backend, layer: String, instance: String, vars: Vec<Var>) -> anyhow::Result<()> {
    match backend {
        Backend::Local(engine) => {
            let refreshed = layerform_engine::refresh(
                &engine,
                RefreshRequest { target_layer: layer, target_instance: instance, extra_vars: vars },
            )
            .await?;
            println!("Refreshed {}/{} ({})", refreshed.definition_name, refreshed.instance_name, refreshed.status);
            Ok(())
        }
        Backend::Remote(client) => {
            let refreshed = client.refresh(&layer, &instance, &vars).await?;
            println!("Refreshed {}/{} ({})", refreshed.definition_name, refreshed.instance_name, refreshed.status);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
