// SPDX-License-Identifier: MIT

use std::io::{self, Write};

use anyhow::Context as _;
use layerform_core::Var;
use layerform_engine::KillRequest;

use crate::config::Backend;

pub async fn run(
    backend: Backend,
    layer: String,
    instance: String,
    vars: Vec<Var>,
    auto_approve: bool,
) -> anyhow::Result<()> {
    if !auto_approve && !confirm(&layer, &instance)? {
        println!("Aborted, {layer}/{instance} was not killed.");
        return Ok(());
    }

    match backend {
        Backend::Local(engine) => {
            layerform_engine::kill(&engine, KillRequest { target_layer: layer.clone(), target_instance: instance.clone(), extra_vars: vars })
                .await?;
        }
        Backend::Remote(client) => {
            client.kill(&layer, &instance, &vars).await?;
        }
    }

    println!("Killed {layer}/{instance}.");
    Ok(())
}

/// Ask for confirmation on stdin unless `--auto-approve` was given. EOF
/// (no terminal attached) counts as a decline, not an error.
fn confirm(layer: &str, instance: &str) -> anyhow::Result<bool> {
    print!("Kill {layer}/{instance}? Only 'yes' will be accepted: ");
    io::stdout().flush().context("flush stdout")?;
    let line = match io::stdin().lines().next() {
        Some(line) => line.context("reading confirmation")?,
        None => return Ok(false),
    };
    Ok(is_confirmed(&line))
}

fn is_confirmed(line: &str) -> bool {
    line.trim() == "yes"
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
