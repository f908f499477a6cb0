// SPDX-License-Identifier: MIT

//! Config-file loading and context resolution.
//!
//! A context names one of three backend shapes (`local`, `s3`, `cloud`).
//! Library crates never read this file or these env vars directly — only
//! the CLI does, then builds the concrete stores/adapters the engine needs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use layerform_adapters::RemoteBackendClient;
use layerform_storage::{DefinitionStore, FileDefinitionStore, FileInstanceStore, InstanceStore, LocalFileMedium};
use serde::{Deserialize, Serialize};

const DEFINITIONS_FILE: &str = "definitions.json";
const INSTANCES_FILE: &str = "instances.json";
const ENV_FILE: &str = "env.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Context {
    Local { dir: String },
    S3 { bucket: String, region: String },
    Cloud { url: String, email: String, password: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "currentContext")]
    pub current_context: String,
    pub contexts: HashMap<String, Context>,
}

impl Config {
    pub fn current(&self) -> anyhow::Result<&Context> {
        self.contexts
            .get(&self.current_context)
            .with_context(|| format!("current context \"{}\" has no entry", self.current_context))
    }
}

/// The first well-known config path that exists, per the precedence order:
/// `$LF_CONFIG_PATH`, then `$XDG_CONFIG_HOME/layerform/config.yml`, then
/// `~/.layerform/config.yml`.
pub fn resolve_path() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.is_file())
}

/// Where `config set-context`/`use-context` write, regardless of whether
/// the file exists yet: the first candidate whose directory we could use.
pub fn write_path() -> PathBuf {
    candidate_paths().into_iter().next().unwrap_or_else(default_home_path)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(p) = std::env::var("LF_CONFIG_PATH") {
        if !p.is_empty() {
            paths.push(PathBuf::from(p));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            paths.push(PathBuf::from(xdg).join("layerform").join("config.yml"));
        }
    }
    paths.push(default_home_path());
    paths
}

fn default_home_path() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".layerform").join("config.yml")
}

fn synthesized_default() -> Config {
    let mut contexts = HashMap::new();
    contexts.insert("local".to_string(), Context::Local { dir: ".layerform".to_string() });
    Config { current_context: "local".to_string(), contexts }
}

/// Load the config, applying the `LF_CLOUD_*` override to the current
/// context if all three env vars are set and non-empty. Synthesizes an
/// in-memory all-local default when no config file exists anywhere.
pub fn load() -> anyhow::Result<Config> {
    let mut config = match resolve_path() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => synthesized_default(),
    };

    if let Some(ctx) = cloud_override() {
        config.contexts.insert(config.current_context.clone(), ctx);
    }

    Ok(config)
}

fn cloud_override() -> Option<Context> {
    let url = std::env::var("LF_CLOUD_URL").unwrap_or_default();
    let email = std::env::var("LF_CLOUD_EMAIL").unwrap_or_default();
    let password = std::env::var("LF_CLOUD_PASSWORD").unwrap_or_default();
    if url.is_empty() || email.is_empty() || password.is_empty() {
        return None;
    }
    Some(Context::Cloud { url, email, password })
}

pub fn save(config: &Config) -> anyhow::Result<()> {
    let path = write_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let text = serde_yaml::to_string(config).context("encoding config as yaml")?;
    std::fs::write(&path, text).with_context(|| format!("writing config file {}", path.display()))
}

/// The stores/adapter pair a local or s3 context needs to build an [`Engine`](layerform_engine::Engine).
pub struct LocalBackend {
    pub definitions: Arc<dyn DefinitionStore>,
    pub instances: Arc<dyn InstanceStore>,
}

/// Build the local-filesystem-backed stores for a `local` context. `s3`
/// contexts are out of scope here since `ObjectStoreMedium` needs async
/// construction; callers that need `s3` build it at the call site.
pub fn local_backend(dir: &str) -> LocalBackend {
    let root = PathBuf::from(dir);
    LocalBackend {
        definitions: Arc::new(FileDefinitionStore::new(LocalFileMedium::new(root.join(DEFINITIONS_FILE)))),
        instances: Arc::new(FileInstanceStore::new(LocalFileMedium::new(root.join(INSTANCES_FILE)))),
    }
}

/// Either a local engine backend or an authenticated remote client,
/// selected by the current context's `type`.
pub enum Backend {
    Local(layerform_engine::Engine),
    Remote(RemoteBackendClient),
}

pub async fn backend_for(ctx: &Context, provisioner: Arc<dyn layerform_adapters::ProvisionerAdapter>) -> anyhow::Result<Backend> {
    match ctx {
        Context::Local { dir } => {
            let stores = local_backend(dir);
            Ok(Backend::Local(layerform_engine::Engine::new(stores.definitions, stores.instances, provisioner)))
        }
        Context::S3 { bucket, region } => {
            let store = object_store::aws::AmazonS3Builder::new()
                .with_bucket_name(bucket)
                .with_region(region)
                .build()
                .context("building s3 client")?;
            let store: Arc<dyn object_store::ObjectStore> = Arc::new(store);
            let definitions: Arc<dyn DefinitionStore> = Arc::new(FileDefinitionStore::new(
                layerform_storage::ObjectStoreMedium::new(store.clone(), DEFINITIONS_FILE),
            ));
            let instances: Arc<dyn InstanceStore> =
                Arc::new(FileInstanceStore::new(layerform_storage::ObjectStoreMedium::new(store, INSTANCES_FILE)));
            Ok(Backend::Local(layerform_engine::Engine::new(definitions, instances, provisioner)))
        }
        Context::Cloud { url, email, password } => {
            let client = RemoteBackendClient::sign_in(url.clone(), email, password).await?;
            Ok(Backend::Remote(client))
        }
    }
}

/// Path to the local `set-env` record file for a `local` context. `s3` and
/// `cloud` contexts keep env vars server-side instead.
pub fn local_env_path(dir: &str) -> PathBuf {
    PathBuf::from(dir).join(ENV_FILE)
}

/// Validate that a context carries the fields its type requires, mirroring
/// the CLI-side field requirements of `config set-context`.
pub fn validate_context(ctx: &Context) -> anyhow::Result<()> {
    match ctx {
        Context::Local { dir } if dir.trim().is_empty() => bail!("local context requires --dir"),
        Context::S3 { bucket, .. } if bucket.trim().is_empty() => bail!("s3 context requires --bucket"),
        Context::S3 { region, .. } if region.trim().is_empty() => bail!("s3 context requires --region"),
        Context::Cloud { url, .. } if url.trim().is_empty() => bail!("cloud context requires --url"),
        Context::Cloud { email, .. } if email.trim().is_empty() => bail!("cloud context requires --email"),
        Context::Cloud { password, .. } if password.trim().is_empty() => bail!("cloud context requires --password"),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
