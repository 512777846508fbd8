use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::graph::DependencyGraph;

/// Files reachable from the entry points, plus the order they were visited in
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    reachable: FxHashSet<String>,
    order: Vec<String>,
}

impl Reachability {
    pub fn contains(&self, file: &str) -> bool {
        self.reachable.contains(file)
    }

    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    /// Breadth-first visitation order; diagnostic only
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Reachable files in path order
    pub fn sorted(&self) -> Vec<String> {
        let mut files = self.order.clone();
        files.sort();
        files
    }
}

/// Breadth-first walk of forward edges from `entries`.
///
/// A file is queued at most once, so cycles and diamonds terminate. Entries
/// that are not graph vertices are ignored; no entries gives an empty result.
pub fn find_reachable<S: AsRef<str>>(graph: &DependencyGraph, entries: &[S]) -> Reachability {
    let mut reachable = FxHashSet::default();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    for entry in entries {
        let entry = entry.as_ref();
        if graph.contains(entry) && reachable.insert(entry.to_string()) {
            queue.push_back(entry.to_string());
        }
    }

    while let Some(file) = queue.pop_front() {
        for imported in graph.imports_of(&file) {
            if reachable.insert(imported.to_string()) {
                queue.push_back(imported.to_string());
            }
        }
        order.push(file);
    }

    Reachability { reachable, order }
}
