// SPDX-License-Identifier: MIT

use anyhow::bail;
use layerform_core::Var;

use crate::config::{local_env_path, Backend, Context};
use crate::env_store::EnvVarStore;

pub async fn run(ctx: &Context, backend: Backend, name: String, value: String) -> anyhow::Result<()> {
    let var = Var::new(name, value);
    let var_name = var.name.clone();
    match ctx {
        Context::Local { dir } => {
            let store = EnvVarStore::new(local_env_path(dir));
            store.upsert(var).await?;
        }
        Context::S3 { .. } => bail!("set-env is not supported against an s3 context yet"),
        Context::Cloud { .. } => {
            let Backend::Remote(client) = backend else { bail!("cloud context resolved to a local backend") };
            client.set_env_var(&var).await?;
        }
    }
    println!("Set {}.", var_name);
    Ok(())
}

#[cfg(test)]
#[path = "set_env_tests.rs"]
mod tests;
