//! Width-aware topological layering.
//!
//! A variant of Kahn's algorithm that emits whole layers instead of a
//! flat order: every node in a layer only depends on nodes in strictly
//! earlier layers (or in the caller's start set), so the members of a
//! layer can be built in parallel.

use std::collections::{HashMap, HashSet};

use grava_util::errors::GravaError;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::graph::DependencyGraph;

/// Compute the layered build order for `graph`.
///
/// `start_set` names packages considered already satisfied (for
/// example already installed): they are excluded from the output and
/// the edges into them count as satisfied, so they never block their
/// dependents. Nodes within a layer are sorted by name for
/// reproducible output.
///
/// Returns `CyclicDependency` naming a concrete cycle when no valid
/// order exists; nodes are never silently dropped.
pub fn topo_sorted_layer_map(
    graph: &DependencyGraph,
    start_set: Option<&HashSet<String>>,
) -> Result<Vec<Vec<NodeIndex>>, GravaError> {
    let satisfied: HashSet<NodeIndex> = start_set
        .map(|names| names.iter().filter_map(|n| graph.lookup(n)).collect())
        .unwrap_or_default();

    let inner = graph.inner();

    // pending[n] = outgoing edges from n to not-yet-placed dependencies
    let mut pending: HashMap<NodeIndex, usize> = HashMap::new();
    for idx in inner.node_indices() {
        if satisfied.contains(&idx) {
            continue;
        }
        let count = inner
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| !satisfied.contains(&e.target()))
            .count();
        pending.insert(idx, count);
    }

    let mut result: Vec<Vec<NodeIndex>> = Vec::new();
    while !pending.is_empty() {
        let mut layer: Vec<NodeIndex> = pending
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&idx, _)| idx)
            .collect();
        if layer.is_empty() {
            return Err(GravaError::CyclicDependency {
                cycle: find_cycle(graph, &pending),
            });
        }
        layer.sort_by(|a, b| graph.node(*a).name.cmp(&graph.node(*b).name));

        for &idx in &layer {
            pending.remove(&idx);
        }
        for &idx in &layer {
            for edge in inner.edges_directed(idx, Direction::Incoming) {
                if let Some(count) = pending.get_mut(&edge.source()) {
                    *count -= 1;
                }
            }
        }
        result.push(layer);
    }

    Ok(result)
}

/// Locate one concrete cycle among the remaining nodes and format it
/// as `a -> b -> a`.
///
/// Only called after the layering pass stalls, so a cycle is
/// guaranteed to exist within `remaining`.
fn find_cycle(graph: &DependencyGraph, remaining: &HashMap<NodeIndex, usize>) -> String {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    for &start in remaining.keys() {
        if visited.contains(&start) {
            continue;
        }
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        if let Some(cycle) = dfs(graph, remaining, start, &mut visited, &mut path, &mut on_path) {
            return cycle
                .iter()
                .map(|&idx| graph.node(idx).name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
        }
    }
    // Unreachable after a stalled pass; kept total for safety.
    String::from("<unidentified cycle>")
}

fn dfs(
    graph: &DependencyGraph,
    remaining: &HashMap<NodeIndex, usize>,
    current: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
    path: &mut Vec<NodeIndex>,
    on_path: &mut HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    visited.insert(current);
    path.push(current);
    on_path.insert(current);

    for (next, _) in graph.dependencies_of(current) {
        if !remaining.contains_key(&next) {
            continue;
        }
        if on_path.contains(&next) {
            if let Some(pos) = path.iter().position(|&n| n == next) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
        }
        if !visited.contains(&next) {
            if let Some(cycle) = dfs(graph, remaining, next, visited, path, on_path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    on_path.remove(&current);
    None
}
