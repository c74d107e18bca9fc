//! Static dependency graph of declared modules.
//!
//! The registry only discovers its graph while resolving. This module builds
//! the same graph from the declared dependency lists up front, so cycles,
//! missing modules and load order can be reported without running a single
//! definition. [`Package::graph`](crate::Package::graph) produces one from a
//! live package; the CLI uses it for `check`, `order` and `tree`.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{PackageError, Result};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph of module names; an edge `a -> b` means `a` needs `b`.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    registered: HashSet<String>,
}

impl ModuleGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// Add a registered module.
    pub fn add_module(&mut self, name: &str) {
        self.ensure_node(name);
        self.registered.insert(name.to_string());
    }

    /// Record that `from` needs `to`.
    ///
    /// `to` does not have to be registered; unregistered targets are
    /// reported by [`missing`](ModuleGraph::missing).
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        // Repeated declarations add no new edge
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Direct dependencies in declaration order.
    #[must_use]
    pub fn direct_deps(&self, name: &str) -> Vec<String> {
        self.node_map
            .get(name)
            .map(|&idx| self.ordered_neighbors(idx).map(|n| self.graph[n].clone()).collect())
            .unwrap_or_default()
    }

    /// petgraph lists neighbors newest edge first; reverse to declaration order.
    fn ordered_neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        neighbors.reverse();
        neighbors.into_iter()
    }

    /// Every module `name` depends on, directly or indirectly.
    #[must_use]
    pub fn transitive_deps(&self, name: &str) -> HashSet<String> {
        let mut deps = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&node_idx) = self.node_map.get(name) {
            queue.push_back(node_idx);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Names that are depended on but never registered, sorted.
    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .node_map
            .keys()
            .filter(|name| !self.registered.contains(*name))
            .cloned()
            .collect();
        missing.sort();
        missing
    }

    /// Detect cycles using DFS with colors.
    ///
    /// The error's chain is the cycle path, closed by repeating its first
    /// module (`a -> b -> a`).
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let chain: Vec<String> = cycle.iter().map(|&n| self.graph[n].clone()).collect();
                return Err(PackageError::CircularDependency {
                    duplicates: chain.first().cloned().into_iter().collect(),
                    chain,
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.ordered_neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Every module, dependencies before their dependents.
    pub fn load_order(&self) -> Result<Vec<String>> {
        self.detect_cycles()?;

        let indices = toposort(&self.graph, None).map_err(|cycle| PackageError::Other {
            message: format!(
                "Failed to determine load order near '{}'",
                self.graph[cycle.node_id()]
            ),
        })?;

        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// The order in which resolving `roots` would run definitions.
    ///
    /// Mirrors the runtime walk: depth-first, dependencies in declaration
    /// order, each module once.
    pub fn load_order_for(&self, roots: &[String]) -> Result<Vec<String>> {
        self.detect_cycles()?;

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        for root in roots {
            let idx = self.node_map.get(root).copied().ok_or_else(|| {
                PackageError::ModuleNotFound {
                    name: root.clone(),
                    suggestion: None,
                    similar: Vec::new(),
                }
            })?;
            self.post_order(idx, &mut visited, &mut order);
        }
        Ok(order)
    }

    fn post_order(&self, node: NodeIndex, visited: &mut HashSet<NodeIndex>, out: &mut Vec<String>) {
        if !visited.insert(node) {
            return;
        }
        for neighbor in self.ordered_neighbors(node) {
            self.post_order(neighbor, visited, out);
        }
        out.push(self.graph[node].clone());
    }

    /// Returns `true` if the graph has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of modules, registered or merely referenced.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the dependency tree below `root`.
    ///
    /// Undeclared modules are marked `(missing)`; a module that reappears
    /// below itself is cut off with `(circular reference)`.
    #[must_use]
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}{}\n", self.missing_marker(root));
        let mut visited = HashSet::from([root.to_string()]);
        self.build_children(root, &mut result, "", &mut visited);
        result
    }

    fn missing_marker(&self, name: &str) -> &'static str {
        if self.registered.contains(name) {
            ""
        } else {
            " (missing)"
        }
    }

    fn build_children(
        &self,
        name: &str,
        result: &mut String,
        prefix: &str,
        visited: &mut HashSet<String>,
    ) {
        let deps = self.direct_deps(name);
        for (i, dep) in deps.iter().enumerate() {
            let is_last_child = i == deps.len() - 1;
            self.build_tree_string(dep, result, prefix, is_last_child, visited);
        }
    }

    fn build_tree_string(
        &self,
        name: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{name}{}\n", self.missing_marker(name)));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(name.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        self.build_children(name, result, &child_prefix, visited);
        visited.remove(name);
    }
}
