// SPDX-License-Identifier: MIT

use anyhow::{bail, Context as _};

use crate::config::{self, validate_context, Config, Context};

pub fn get_contexts(config: &Config) -> anyhow::Result<()> {
    println!("CURRENT\tNAME\tTYPE\tLOCATION");
    let mut names: Vec<&String> = config.contexts.keys().collect();
    names.sort();
    for name in names {
        let ctx = &config.contexts[name];
        let current = if *name == config.current_context { "*" } else { "" };
        println!("{}\t{}\t{}\t{}", current, name, type_name(ctx), location(ctx));
    }
    Ok(())
}

pub fn select_context(mut config: Config, name: String) -> anyhow::Result<()> {
    if !config.contexts.contains_key(&name) {
        bail!("context {name} does not exist");
    }
    config.current_context = name.clone();
    config::save(&config).context("fail to save config file")?;
    println!("Context \"{name}\" selected.");
    Ok(())
}

pub fn use_context(mut config: Config, name: String) -> anyhow::Result<()> {
    if !config.contexts.contains_key(&name) {
        bail!("no context exists with the name \"{name}\".");
    }
    config.current_context = name.clone();
    config::save(&config).context("fail to save config file")?;
    println!("Switched to context \"{name}\".");
    Ok(())
}

pub fn set_context(mut config: Config, name: String, ctx: Context) -> anyhow::Result<()> {
    validate_context(&ctx).context("invalid context configuration")?;

    let action = match config.contexts.get(&name) {
        None => "created",
        Some(prev) if type_name(prev) != type_name(&ctx) => {
            bail!(
                "{name} context already exists with a different type of {}, context type can't be updated.",
                type_name(prev)
            )
        }
        Some(_) => "modified",
    };

    config.contexts.insert(name.clone(), ctx);
    config.current_context = name.clone();
    config::save(&config).context("fail to save config file")?;
    println!("Context \"{name}\" {action}.");
    Ok(())
}

fn type_name(ctx: &Context) -> &'static str {
    match ctx {
        Context::Local { .. } => "local",
        Context::S3 { .. } => "s3",
        Context::Cloud { .. } => "cloud",
    }
}

fn location(ctx: &Context) -> String {
    match ctx {
        Context::Local { dir } => dir.clone(),
        Context::S3 { bucket, region } => format!("{bucket}/{region}"),
        Context::Cloud { url, .. } => url.clone(),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
