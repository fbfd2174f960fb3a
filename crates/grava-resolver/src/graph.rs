//! Dependency graph construction, rendering, and layering entry points.

use std::collections::{HashMap, HashSet};
use std::fmt;

use grava_core::dependency::DepKind;
use grava_util::errors::GravaError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::layers;

/// Which provider supplied a node's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Found in the local sync database.
    Local,
    /// Found in the source-metadata cache; must be built.
    Source,
    /// Found in neither provider.
    Missing,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Source => "source",
            Self::Missing => "missing",
        })
    }
}

/// A package in the dependency graph.
#[derive(Debug, Clone)]
pub struct PkgNode {
    pub name: String,
    pub version: Option<String>,
    pub origin: Origin,
    /// True when explicitly requested by the caller rather than pulled
    /// in transitively.
    pub target: bool,
}

impl fmt::Display for PkgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}-{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// The resolved dependency graph.
///
/// Edges run from dependent to dependency. At most one node exists per
/// canonical package name; provides names resolve to the owning node
/// through the alias index and never create duplicates.
pub struct DependencyGraph {
    graph: DiGraph<PkgNode, DepKind>,
    /// canonical name -> node
    index: HashMap<String, NodeIndex>,
    /// provides name -> owning node
    aliases: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Insert a node, or merge into the existing node with the same
    /// canonical name.
    ///
    /// Merging ORs the target flag, fills a missing version, upgrades a
    /// `Missing` origin once a provider record turns up, and registers
    /// any new provides names. An alias never shadows a canonical name.
    pub fn add_node(&mut self, node: PkgNode, provides: &[String]) -> NodeIndex {
        let idx = match self.index.get(&node.name) {
            Some(&idx) => {
                let existing = &mut self.graph[idx];
                existing.target |= node.target;
                if existing.version.is_none() {
                    existing.version = node.version;
                }
                if existing.origin == Origin::Missing && node.origin != Origin::Missing {
                    existing.origin = node.origin;
                }
                idx
            }
            None => {
                let name = node.name.clone();
                let idx = self.graph.add_node(node);
                self.index.insert(name, idx);
                idx
            }
        };
        for alias in provides {
            if self.index.contains_key(alias) {
                continue;
            }
            self.aliases.entry(alias.clone()).or_insert(idx);
        }
        idx
    }

    /// Add a dependency edge from `from` to `to`.
    ///
    /// Duplicate (from, to, kind) triples are ignored; the same pair
    /// may carry edges of several kinds. Fails with `InvalidEdge` on a
    /// self-edge or a stale endpoint.
    pub fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        kind: DepKind,
    ) -> Result<(), GravaError> {
        if from == to
            || self.graph.node_weight(from).is_none()
            || self.graph.node_weight(to).is_none()
        {
            return Err(GravaError::InvalidEdge {
                from: self.describe(from),
                to: self.describe(to),
            });
        }
        if !self
            .graph
            .edges_connecting(from, to)
            .any(|e| *e.weight() == kind)
        {
            self.graph.add_edge(from, to, kind);
        }
        Ok(())
    }

    fn describe(&self, idx: NodeIndex) -> String {
        self.graph
            .node_weight(idx)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("#{}", idx.index()))
    }

    /// Look up a node by canonical name or by a name it provides.
    pub fn lookup(&self, name: &str) -> Option<NodeIndex> {
        self.index
            .get(name)
            .or_else(|| self.aliases.get(name))
            .copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &PkgNode {
        &self.graph[idx]
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct dependencies of a node (outgoing edges).
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, DepKind)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
            .collect()
    }

    /// Reverse dependencies (who depends on this node).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, DepKind)> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
            .collect()
    }

    pub(crate) fn inner(&self) -> &DiGraph<PkgNode, DepKind> {
        &self.graph
    }

    /// Deterministic listing of every node and its outgoing edges.
    ///
    /// Nodes are sorted by name; edges within a node by (kind, target
    /// name).
    pub fn render(&self) -> String {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));

        let mut output = String::new();
        for idx in indices {
            let node = &self.graph[idx];
            if node.target {
                output.push_str(&format!("{node} ({}, target)\n", node.origin));
            } else {
                output.push_str(&format!("{node} ({})\n", node.origin));
            }

            let mut edges: Vec<(DepKind, &str)> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| (*e.weight(), self.graph[e.target()].name.as_str()))
                .collect();
            edges.sort();
            for (kind, dep) in edges {
                output.push_str(&format!("  {kind} -> {dep}\n"));
            }
        }
        output
    }

    /// Topologically layered build order.
    ///
    /// `start_set` names packages considered already satisfied; they
    /// are omitted from the output without blocking their dependents.
    /// See [`layers::topo_sorted_layer_map`].
    pub fn topo_sorted_layer_map(
        &self,
        start_set: Option<&HashSet<String>>,
    ) -> Result<Vec<Vec<NodeIndex>>, GravaError> {
        layers::topo_sorted_layer_map(self, start_set)
    }

    /// Pretty-print layers produced by [`Self::topo_sorted_layer_map`].
    pub fn render_layers(&self, layers: &[Vec<NodeIndex>]) -> String {
        let mut output = String::new();
        for (i, layer) in layers.iter().enumerate() {
            let names: Vec<&str> = layer
                .iter()
                .map(|&idx| self.graph[idx].name.as_str())
                .collect();
            output.push_str(&format!("layer {i}: {}\n", names.join(" ")));
        }
        output
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
