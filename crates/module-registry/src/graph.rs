//! # Dependency Graph Analyzer
//!
//! A diagnostic pass over the whole registry, independent of initialization.
//!
//! The resolver only notices a cycle when resolution actually walks into it (a module is
//! requested while it is still `Initializing`). [`validate`] finds every cycle and every
//! missing dependency up front, even among modules that were never requested.
//!
//! The graph is always derived from the registry entries on demand and never stored,
//! so it cannot drift from the registry.

use crate::entry::ModuleEntry;
use crate::module::ModuleStatus;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// One node of the [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub dependencies: Vec<String>,
    /// Modules that declare this one as a dependency.
    pub dependents: Vec<String>,
    pub status: ModuleStatus,
}

/// Read-only snapshot of the registry's dependency structure, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    nodes: IndexMap<String, GraphNode>,
}

impl DependencyGraph {
    pub fn get(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|node| node.dependents.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A declared dependency with no registry entry and no external singleton behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub module: String,
    pub missing_dep: String,
}

/// An edge `module -> circular_dep` that closes a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEdge {
    pub module: String,
    pub circular_dep: String,
}

/// Outcome of [`validate_dependencies`](crate::ModuleRegistry::validate_dependencies).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub missing: Vec<MissingDependency>,
    pub circular: Vec<CycleEdge>,
    pub valid: bool,
}

pub(crate) fn build(entries: &IndexMap<String, ModuleEntry>) -> DependencyGraph {
    let mut nodes: IndexMap<String, GraphNode> = entries
        .iter()
        .map(|(name, entry)| {
            let node = GraphNode {
                dependencies: entry.dependencies.clone(),
                dependents: Vec::new(),
                status: entry.status,
            };
            (name.clone(), node)
        })
        .collect();

    for (name, entry) in entries {
        for dependency in &entry.dependencies {
            if let Some(node) = nodes.get_mut(dependency) {
                if !node.dependents.contains(name) {
                    node.dependents.push(name.clone());
                }
            }
        }
    }

    DependencyGraph { nodes }
}

pub(crate) fn validate(
    entries: &IndexMap<String, ModuleEntry>,
    is_external: impl Fn(&str) -> bool,
) -> ValidationReport {
    let mut missing = Vec::new();
    for (name, entry) in entries {
        for dependency in &entry.dependencies {
            if !entries.contains_key(dependency) && !is_external(dependency.as_str()) {
                missing.push(MissingDependency {
                    module: name.clone(),
                    missing_dep: dependency.clone(),
                });
            }
        }
    }

    let mut circular = Vec::new();
    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    for name in entries.keys() {
        visit(name, entries, &mut visiting, &mut visited, &mut circular);
    }

    let valid = missing.is_empty() && circular.is_empty();
    ValidationReport {
        missing,
        circular,
        valid,
    }
}

/// Depth-first walk. `visiting` holds the nodes on the current path, `visited` the
/// fully explored ones; a dependency found in `visiting` closes a cycle.
fn visit<'a>(
    name: &'a str,
    entries: &'a IndexMap<String, ModuleEntry>,
    visiting: &mut HashSet<&'a str>,
    visited: &mut HashSet<&'a str>,
    circular: &mut Vec<CycleEdge>,
) {
    if visited.contains(name) {
        return;
    }
    let Some(entry) = entries.get(name) else {
        return;
    };

    visiting.insert(name);
    for dependency in &entry.dependencies {
        if visiting.contains(dependency.as_str()) {
            circular.push(CycleEdge {
                module: name.to_string(),
                circular_dep: dependency.clone(),
            });
        } else if !visited.contains(dependency.as_str()) {
            visit(dependency, entries, visiting, visited, circular);
        }
    }
    visiting.remove(name);
    visited.insert(name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Dependencies, FactoryResult, ModuleInstance};

    fn entries(layout: &[(&str, &[&str])]) -> IndexMap<String, ModuleEntry> {
        layout
            .iter()
            .map(|(name, deps)| {
                let entry = ModuleEntry::new(
                    name.to_string(),
                    Box::new(|_: &Dependencies| -> FactoryResult {
                        Ok(Some(ModuleInstance::new(())))
                    }),
                    deps.iter().map(|d| d.to_string()).collect(),
                    Vec::new(),
                );
                (name.to_string(), entry)
            })
            .collect()
    }

    #[test]
    fn test_dependents_are_inverted_dependencies() {
        let entries = entries(&[
            ("dom", &[]),
            ("ui", &["dom"]),
            ("particles", &["dom"]),
            ("buildings", &["ui"]),
        ]);
        let graph = build(&entries);

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.dependents_of("dom"), ["ui", "particles"]);
        assert_eq!(graph.dependents_of("ui"), ["buildings"]);
        assert!(graph.dependents_of("buildings").is_empty());
        assert!(graph.dependents_of("ghost").is_empty());
        assert_eq!(graph.get("ui").unwrap().status, ModuleStatus::Registered);
    }

    #[test]
    fn test_validate_clean_graph() {
        let entries = entries(&[("dom", &[]), ("ui", &["dom"]), ("buildings", &["ui", "dom"])]);
        let report = validate(&entries, |_| false);
        assert!(report.valid);
        assert!(report.missing.is_empty());
        assert!(report.circular.is_empty());
    }

    #[test]
    fn test_validate_reports_missing_but_not_externals() {
        let entries = entries(&[("ui", &["window", "ghost"])]);
        let report = validate(&entries, |name| name == "window");

        assert!(!report.valid);
        assert_eq!(
            report.missing,
            vec![MissingDependency {
                module: "ui".into(),
                missing_dep: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_validate_finds_cycle_not_through_entry_point() {
        // entry -> a -> b -> c -> a
        let entries = entries(&[
            ("entry", &["a"]),
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &["a"]),
        ]);
        let report = validate(&entries, |_| false);

        assert!(!report.valid);
        assert_eq!(
            report.circular,
            vec![CycleEdge {
                module: "c".into(),
                circular_dep: "a".into(),
            }]
        );
    }

    #[test]
    fn test_validate_self_dependency() {
        let entries = entries(&[("loop", &["loop"])]);
        let report = validate(&entries, |_| false);
        assert_eq!(report.circular.len(), 1);
        assert_eq!(report.circular[0].module, "loop");
        assert_eq!(report.circular[0].circular_dep, "loop");
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let entries = entries(&[
            ("base", &[]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("top", &["left", "right"]),
        ]);
        assert!(validate(&entries, |_| false).valid);
    }
}
