// SPDX-License-Identifier: MIT

//! Layer definitions: named, content-addressed bundles of configuration
//! files plus declared base dependencies.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A single file that belongs to a layer definition, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDefinitionFile {
    pub path: String,
    pub content: Vec<u8>,
}

/// A named, content-addressed bundle of configuration files plus the
/// names of the layers it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub name: String,
    pub files: Vec<LayerDefinitionFile>,
    pub dependencies: Vec<String>,
    /// Content-addressed fingerprint of `files` + `dependencies`.
    ///
    /// Stored as a lowercase hex string rather than raw bytes so definition
    /// store documents stay human-diffable JSON.
    pub sha: String,
}

impl LayerDefinition {
    /// Build a definition from its name, files, and dependencies, computing
    /// and stamping its `sha` in the process.
    pub fn new(name: impl Into<String>, files: Vec<LayerDefinitionFile>, dependencies: Vec<String>) -> Self {
        let name = name.into();
        let sha = compute_sha(&files, &dependencies);
        LayerDefinition { name, files, dependencies, sha }
    }

    /// Recompute the SHA from the current `files`/`dependencies` and compare
    /// it against the stored `sha`. Used to detect definitions that were
    /// hand-edited in a store file rather than produced by `new`.
    pub fn sha_matches_content(&self) -> bool {
        self.sha == compute_sha(&self.files, &self.dependencies)
    }
}

/// Compute the SHA-1 fingerprint of a definition's content.
///
/// For each file, in the order given: `"path:"<path>"\n"`, then
/// `"content:"<raw bytes>"\n"`. Then `"deps:"` followed by the
/// lexicographically sorted dependency names concatenated with no
/// separator. This matches the original tool's hashing exactly so stores
/// migrated from it keep stable fingerprints.
pub fn compute_sha(files: &[LayerDefinitionFile], dependencies: &[String]) -> String {
    let mut hasher = Sha1::new();

    for f in files {
        hasher.update(b"path:");
        hasher.update(f.path.as_bytes());
        hasher.update(b"\n");
        hasher.update(b"content:");
        hasher.update(&f.content);
        hasher.update(b"\n");
    }

    let mut deps: Vec<&str> = dependencies.iter().map(String::as_str).collect();
    deps.sort_unstable();

    hasher.update(b"deps:");
    for d in deps {
        hasher.update(d.as_bytes());
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
