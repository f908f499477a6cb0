// SPDX-License-Identifier: MIT

//! Local file-backed store for `set-env` records: a flat JSON array of
//! `{"name","value"}` pairs, upserted by name.

use layerform_core::Var;
use layerform_storage::{LocalFileMedium, Medium, StorageError};

pub struct EnvVarStore {
    medium: LocalFileMedium,
}

impl EnvVarStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        EnvVarStore { medium: LocalFileMedium::new(path) }
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Var>> {
        match self.medium.load().await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(StorageError::NotFound(_)) => Ok(Vec::new()),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn upsert(&self, var: Var) -> anyhow::Result<()> {
        let mut all = self.list().await?;
        match all.iter_mut().find(|v| v.name == var.name) {
            Some(existing) => *existing = var,
            None => all.push(var),
        }
        let bytes = serde_json::to_vec_pretty(&all)?;
        self.medium.save(bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "env_store_tests.rs"]
mod tests;
