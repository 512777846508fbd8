use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use crate::collector::FileSet;
use crate::resolver::Resolution;
use crate::scan::ImportEdge;

/// Import graph over the collected files.
///
/// `reverse` is a cache of "imported by" and is filled in the same pass as
/// `forward`, so the two never disagree.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    vertices: BTreeSet<String>,
    forward: FxHashMap<String, BTreeSet<String>>,
    reverse: FxHashMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Fold the resolved edges into adjacency over exactly `files`.
    ///
    /// Edges whose either end lies outside the file set are dropped.
    pub fn build(files: &FileSet, edges: &[ImportEdge]) -> Self {
        let vertices: BTreeSet<String> = files.paths().map(String::from).collect();
        let mut forward: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();
        let mut reverse: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();

        for edge in edges {
            let Resolution::Resolved(target) = &edge.resolution else {
                continue;
            };
            if !vertices.contains(&edge.source) || !vertices.contains(target) {
                continue;
            }
            forward.entry(edge.source.clone()).or_default().insert(target.clone());
            reverse.entry(target.clone()).or_default().insert(edge.source.clone());
        }

        Self { vertices, forward, reverse }
    }

    pub fn contains(&self, file: &str) -> bool {
        self.vertices.contains(file)
    }

    /// Files `file` imports directly, in path order
    pub fn imports_of(&self, file: &str) -> impl Iterator<Item = &str> {
        self.forward.get(file).into_iter().flatten().map(String::as_str)
    }

    /// Files that import `file` directly, in path order
    pub fn importers_of(&self, file: &str) -> impl Iterator<Item = &str> {
        self.reverse.get(file).into_iter().flatten().map(String::as_str)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(String::as_str)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }
}
