// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "lf", about = "Orchestrate reusable infrastructure layers", version)]
pub struct Cli {
    /// Raise logging verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate and publish layer definitions from a definition file.
    Configure {
        #[arg(long)]
        file: PathBuf,
    },

    /// List definitions or instances.
    List {
        #[command(subcommand)]
        what: ListWhat,
    },

    /// Materialize a layer and its dependencies.
    Spawn {
        layer: String,
        /// Instance name; a random one is generated when omitted.
        instance: Option<String>,
        /// Bind a dependency's definition name to an existing instance name.
        #[arg(long = "base", value_parser = parse_key_val)]
        base: Vec<(String, String)>,
        /// `NAME=VALUE`, passed to the provisioner as a var or child-process env var.
        #[arg(long = "var", value_parser = parse_var)]
        var: Vec<layerform_core::Var>,
    },

    /// Destroy an instance's uniquely-owned resources.
    Kill {
        layer: String,
        instance: String,
        #[arg(long = "var", value_parser = parse_var)]
        var: Vec<layerform_core::Var>,
        #[arg(long)]
        auto_approve: bool,
    },

    /// Re-apply a layer's definition against its current state.
    Refresh {
        layer: String,
        instance: String,
        #[arg(long = "var", value_parser = parse_var)]
        var: Vec<layerform_core::Var>,
    },

    /// Print an instance's provisioner outputs.
    Output {
        layer: String,
        instance: String,
        /// Render outputs through this template instead of printing JSON.
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Upsert an environment-variable record used by future provisioner runs.
    SetEnv { name: String, value: String },

    /// Manage named contexts in the config file.
    Config {
        #[command(subcommand)]
        what: ConfigWhat,
    },
}

#[derive(Debug, Subcommand)]
pub enum ListWhat {
    Definitions {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    Instances {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigWhat {
    GetContexts,
    UseContext { name: String },
    SelectContext { name: String },
    SetContext {
        name: String,
        #[arg(short = 't', long, value_enum, default_value_t = ContextType::Local)]
        r#type: ContextType,
        #[arg(long, default_value = "")]
        dir: String,
        #[arg(long, default_value = "")]
        bucket: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContextType {
    Local,
    S3,
    Cloud,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got \"{s}\""))?;
    Ok((k.to_string(), v.to_string()))
}

fn parse_var(s: &str) -> Result<layerform_core::Var, String> {
    let (k, v) = parse_key_val(s)?;
    Ok(layerform_core::Var::new(k, v))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
