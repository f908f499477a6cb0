// SPDX-License-Identifier: MIT

//! Merges provisioner state files from multiple base instances into one
//! composite state so an upper layer sees a single coherent world.

use std::collections::HashSet;
use std::path::Path;

use layerform_adapters::ProvisionerAdapter;
use tracing::instrument;

use crate::error::EngineError;

/// Copy `base` to `dest`, then move in every resource address that exists
/// in one of `others` but not already in `base` (or in an earlier entry of
/// `others`). The first address wins when the same address appears in more
/// than one of `others`.
#[instrument(skip(adapter, others), fields(base = %base.display(), dest = %dest.display(), others = others.len()))]
pub async fn merge_states(
    adapter: &dyn ProvisionerAdapter,
    base: &Path,
    others: &[&Path],
    dest: &Path,
) -> Result<(), EngineError> {
    if base != dest {
        tokio::fs::copy(base, dest)
            .await
            .map_err(|e| EngineError::Workdir(format!("copying {} to {}: {e}", base.display(), dest.display())))?;
    }

    let mut seen: HashSet<String> = adapter
        .show_state(dest)
        .await?
        .addresses
        .into_iter()
        .map(|a| a.0)
        .collect();

    for other in others {
        let other_state = adapter.show_state(other).await?;
        for addr in other_state.addresses {
            if seen.contains(&addr.0) {
                continue;
            }
            adapter.state_mv(other, dest, &addr).await?;
            seen.insert(addr.0);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "merger_tests.rs"]
mod tests;
