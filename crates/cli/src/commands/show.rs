// SPDX-License-Identifier: MIT

use std::path::Path;

use anyhow::{bail, Context as _};
use layerform_engine::{build_workdir, PathEntry};
use serde_json::Value;
use tera::Tera;

use crate::config::Backend;

pub async fn run(backend: Backend, layer: String, instance: String, template: Option<&Path>) -> anyhow::Result<()> {
    let output = match &backend {
        Backend::Local(engine) => {
            let record = engine
                .instances
                .get(&layer, &instance)
                .await
                .with_context(|| format!("instance {layer}/{instance} not found"))?;
            let def = engine.definitions.get(&layer).await?;

            let workdir = tempfile::tempdir().context("creating scratch directory")?;
            let path_entries = [PathEntry { definition: &def, instance_name: &instance }];
            build_workdir(workdir.path(), &path_entries).await?;
            engine.provisioner.init(workdir.path(), Some(&def.sha)).await?;

            let state_path = workdir.path().join("terraform.tfstate");
            tokio::fs::write(&state_path, &record.bytes).await.context("writing state to work directory")?;

            engine.provisioner.output(workdir.path()).await?
        }
        Backend::Remote(_) => bail!("output is not supported against a cloud context yet"),
    };

    let as_json: Value = serde_json::to_value(&output)?;

    match template {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading template {}", path.display()))?;
            let mut tera = Tera::default();
            tera.add_raw_template("output", &text).context("parsing template")?;
            let ctx = tera::Context::from_value(as_json).context("building template context")?;
            let rendered = tera.render("output", &ctx).context("rendering template")?;
            print!("{rendered}");
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&as_json)?);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
