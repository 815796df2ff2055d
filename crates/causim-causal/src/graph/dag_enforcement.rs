//! Cycle detection before every edge insertion, plus whole-graph checks
//! for time ordering and the Treatment/Outcome endpoints.

use causim_core::errors::CausalError;
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{Dfs, EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use super::stable_graph::{CausalGraph, CausalNode, DependencyStableGraph, NodeKind};

/// Check whether adding an edge from `source` to `target` would create a cycle.
///
/// Returns `true` if a cycle would be created (edge should be rejected).
pub fn would_create_cycle(graph: &CausalGraph, source: NodeIndex, target: NodeIndex) -> bool {
    // Self-loops are always cycles.
    if source == target {
        return true;
    }
    has_path(&graph.graph, target, source)
}

/// DFS reachability: can we reach `to` from `from`?
pub(crate) fn has_path(graph: &DependencyStableGraph, from: NodeIndex, to: NodeIndex) -> bool {
    let mut dfs = Dfs::new(graph, from);
    while let Some(node) = dfs.next(graph) {
        if node == to {
            return true;
        }
    }
    false
}

/// Returns the SCCs with more than one node, i.e. the cycles.
pub fn find_cycles(graph: &CausalGraph) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(&graph.graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect()
}

/// Time position of a node. `Treatment` sits at the intervention time and
/// `Outcome` at the final step.
pub fn node_time(node: &CausalNode, intervention_time: usize, end_time: usize) -> Option<usize> {
    match node.kind {
        NodeKind::State | NodeKind::Param => node.step,
        NodeKind::Treatment => Some(intervention_time),
        NodeKind::Outcome => Some(end_time),
    }
}

/// Reject any edge whose source sits at a later step than its target.
pub fn check_time_order(
    graph: &CausalGraph,
    intervention_time: usize,
    end_time: usize,
) -> Result<(), CausalError> {
    for edge in graph.graph.edge_references() {
        let (Some(source), Some(target)) = (
            graph.graph.node_weight(edge.source()),
            graph.graph.node_weight(edge.target()),
        ) else {
            continue;
        };
        let source_time = node_time(source, intervention_time, end_time);
        let target_time = node_time(target, intervention_time, end_time);
        if let (Some(s), Some(t)) = (source_time, target_time) {
            if s > t {
                return Err(CausalError::TimeOrderViolation {
                    source_node: source.name.clone(),
                    target_node: target.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Exactly one Treatment and one Outcome. Treatment's parents sit at or
/// before the intervention time. Outcome reads only the final state, so its
/// parents sit exactly at `end_time`, apart from the synthetic
/// Treatment -> Outcome edge.
pub fn check_endpoints(
    graph: &CausalGraph,
    intervention_time: usize,
    end_time: usize,
) -> Result<(), CausalError> {
    let treatment = single_endpoint(graph, NodeKind::Treatment, graph.treatment_name())?;
    let outcome = single_endpoint(graph, NodeKind::Outcome, graph.outcome_name())?;

    for parent in graph.graph.neighbors_directed(treatment, Direction::Incoming) {
        let Some(node) = graph.graph.node_weight(parent) else {
            continue;
        };
        match node.step {
            Some(step) if step <= intervention_time => {}
            _ => {
                return Err(CausalError::EndpointBounds {
                    node: graph.treatment_name().to_string(),
                    parent: node.name.clone(),
                    reason: format!("must be a step node at or before step {intervention_time}"),
                })
            }
        }
    }

    for parent in graph.graph.neighbors_directed(outcome, Direction::Incoming) {
        let Some(node) = graph.graph.node_weight(parent) else {
            continue;
        };
        let ok = match node.kind {
            NodeKind::Treatment => true,
            _ => node.step == Some(end_time),
        };
        if !ok {
            return Err(CausalError::EndpointBounds {
                node: graph.outcome_name().to_string(),
                parent: node.name.clone(),
                reason: format!("must be a step node at step {end_time}"),
            });
        }
    }
    Ok(())
}

fn single_endpoint(graph: &CausalGraph, kind: NodeKind, name: &str) -> Result<NodeIndex, CausalError> {
    let count = graph.nodes_of_kind(kind).len();
    if count != 1 {
        return Err(CausalError::EndpointCount {
            node: name.to_string(),
            count,
        });
    }
    graph.get_node(name).ok_or_else(|| CausalError::EndpointCount {
        node: name.to_string(),
        count: 0,
    })
}
