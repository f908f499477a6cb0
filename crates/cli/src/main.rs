// SPDX-License-Identifier: MIT

mod cli;
mod commands;
mod config;
mod env_store;
mod output;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use cli::{Cli, ConfigWhat, Command, ContextType, ListWhat};
use layerform_adapters::{ProvisionerAdapter, RealProvisioner};
use tracing_subscriber::EnvFilter;

use crate::config::Backend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Config { what } => {
            let cfg = config::load()?;
            return match what {
                ConfigWhat::GetContexts => commands::context::get_contexts(&cfg),
                ConfigWhat::UseContext { name } => commands::context::use_context(cfg, name),
                ConfigWhat::SelectContext { name } => commands::context::select_context(cfg, name),
                ConfigWhat::SetContext { name, r#type, dir, bucket, region, url, email, password } => {
                    let ctx = match r#type {
                        ContextType::Local => config::Context::Local { dir },
                        ContextType::S3 => config::Context::S3 { bucket, region },
                        ContextType::Cloud => config::Context::Cloud { url, email, password },
                    };
                    commands::context::set_context(cfg, name, ctx)
                }
            };
        }
        Command::SetEnv { name, value } => {
            let cfg = config::load()?;
            let ctx = cfg.current()?.clone();
            let provisioner = provisioner()?;
            let backend = config::backend_for(&ctx, provisioner).await?;
            return commands::set_env::run(&ctx, backend, name, value).await;
        }
        Command::Configure { file } => {
            let backend = current_backend().await?;
            commands::configure::run(backend, &file).await
        }
        Command::List { what } => {
            let backend = current_backend().await?;
            match what {
                ListWhat::Definitions { output } => commands::list::definitions(backend, output).await,
                ListWhat::Instances { output } => commands::list::instances(backend, output).await,
            }
        }
        Command::Spawn { layer, instance, base, var } => {
            let backend = current_backend().await?;
            let instance = instance.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
            commands::spawn::run(backend, layer, instance, base, var).await
        }
        Command::Kill { layer, instance, var, auto_approve } => {
            let backend = current_backend().await?;
            commands::kill::run(backend, layer, instance, var, auto_approve).await
        }
        Command::Refresh { layer, instance, var } => {
            let backend = current_backend().await?;
            commands::refresh::run(backend, layer, instance, var).await
        }
        Command::Output { layer, instance, template } => {
            let backend = current_backend().await?;
            commands::show::run(backend, layer, instance, template.as_deref()).await
        }
    }
}

async fn current_backend() -> anyhow::Result<Backend> {
    let cfg = config::load()?;
    let ctx = cfg.current()?;
    let provisioner = provisioner()?;
    config::backend_for(ctx, provisioner).await
}

fn provisioner() -> anyhow::Result<Arc<dyn ProvisionerAdapter>> {
    Ok(Arc::new(RealProvisioner::new(None).context("locating the provisioner binary")?))
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("LF_LOG")
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
