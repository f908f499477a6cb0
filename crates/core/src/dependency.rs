// SPDX-License-Identifier: MIT

//! Dependency-graph algorithms shared by the engine's spawn/kill walkers and
//! by `list definitions`' depth-ordered output.
//!
//! These operate purely on `name -> dependency names` maps so this crate
//! never needs to depend on the storage backends that own the actual
//! [`LayerDefinition`](crate::LayerDefinition) records.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::instrument;

use crate::definition::LayerDefinition;
use crate::instance::LayerInstance;

/// A cycle was found among the given definitions' `dependencies` edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// The cycle, in traversal order, e.g. `["a", "b", "c", "a"]`.
    pub path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular dependency: {}", self.path.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detect a cycle in the dependency graph described by `edges`
/// (`definition name -> names it depends on`). Three-color DFS: a gray-to-gray
/// edge is a back edge and therefore a cycle.
pub fn detect_cycle(edges: &HashMap<String, Vec<String>>) -> Result<(), CycleError> {
    let mut colors: HashMap<&str, Color> =
        edges.keys().map(|k| (k.as_str(), Color::White)).collect();
    let mut stack: Vec<String> = Vec::new();

    for start in edges.keys() {
        if colors.get(start.as_str()) == Some(&Color::White) {
            visit(start, edges, &mut colors, &mut stack)?;
        }
    }

    Ok(())
}

fn visit<'a>(
    node: &'a str,
    edges: &'a HashMap<String, Vec<String>>,
    colors: &mut HashMap<&'a str, Color>,
    stack: &mut Vec<String>,
) -> Result<(), CycleError> {
    colors.insert(node, Color::Gray);
    stack.push(node.to_string());

    if let Some(deps) = edges.get(node) {
        for dep in deps {
            match colors.get(dep.as_str()) {
                Some(Color::Gray) => {
                    let mut path = stack.clone();
                    path.push(dep.clone());
                    let start = path.iter().position(|n| n == dep).unwrap_or(0);
                    return Err(CycleError { path: path[start..].to_vec() });
                }
                Some(Color::White) => visit(dep, edges, colors, stack)?,
                _ => {}
            }
        }
    }

    stack.pop();
    colors.insert(node, Color::Black);
    Ok(())
}

/// Longest path from `name` down to a leaf (a definition with no
/// dependencies), counting edges. Leaves have depth 0. Used to order
/// `list definitions` output from base to top.
///
/// Returns `None` if `name` is not present in `edges`.
pub fn depth(name: &str, edges: &HashMap<String, Vec<String>>) -> Option<usize> {
    let mut memo = HashMap::new();
    depth_inner(name, edges, &mut memo, &mut HashSet::new())
}

fn depth_inner<'a>(
    name: &'a str,
    edges: &'a HashMap<String, Vec<String>>,
    memo: &mut HashMap<&'a str, usize>,
    visiting: &mut HashSet<&'a str>,
) -> Option<usize> {
    if let Some(&d) = memo.get(name) {
        return Some(d);
    }

    let deps = edges.get(name)?;
    if deps.is_empty() {
        memo.insert(name, 0);
        return Some(0);
    }

    if !visiting.insert(name) {
        // Already on the current path; a cycle. Treat as depth 0 rather
        // than recursing forever — detect_cycle is the authority on cycles.
        return Some(0);
    }

    let max_child = deps
        .iter()
        .filter_map(|d| depth_inner(d, edges, memo, visiting))
        .max()
        .unwrap_or(0);

    visiting.remove(name);
    let d = max_child + 1;
    memo.insert(name, d);
    Some(d)
}

/// `(definition_name, instance_name)` of an instance that binds to the
/// target, directly or transitively.
pub type Dependant = (String, String);

/// True if any instance in `all` binds to `(layer, instance)` for one of
/// its definition's declared dependencies (explicitly, or implicitly via
/// the `"default"` binding).
pub fn has_dependants(
    all: &[LayerInstance],
    defs: &HashMap<String, LayerDefinition>,
    layer: &str,
    instance: &str,
) -> bool {
    all.iter().any(|candidate| binds_to(candidate, defs, layer, instance))
}

/// Every instance that binds to `(layer, instance)`, directly or through a
/// chain of intermediate default bindings, searched with a DFS guarded by a
/// visited set so diamonds terminate.
#[instrument(skip(all, defs))]
pub fn dependants_transitive(
    all: &[LayerInstance],
    defs: &HashMap<String, LayerDefinition>,
    layer: &str,
    instance: &str,
) -> Vec<Dependant> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    let mut frontier = vec![(layer.to_string(), instance.to_string())];

    while let Some((def, inst)) = frontier.pop() {
        if !visited.insert((def.clone(), inst.clone())) {
            continue;
        }
        for candidate in all {
            if binds_to(candidate, defs, &def, &inst) {
                let key = (candidate.definition_name.clone(), candidate.instance_name.clone());
                if !found.contains(&key) {
                    found.push(key.clone());
                    frontier.push(key);
                }
            }
        }
    }

    found
}

fn binds_to(candidate: &LayerInstance, defs: &HashMap<String, LayerDefinition>, layer: &str, instance: &str) -> bool {
    let Some(def) = defs.get(&candidate.definition_name) else { return false };
    def.dependencies.iter().any(|dep| dep == layer) && candidate.dependency_instance_name(layer) == instance
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
