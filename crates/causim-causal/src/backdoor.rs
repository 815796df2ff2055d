//! Backdoor screening: which observed nodes to adjust for, and which
//! unobserved nodes still confound Treatment and Outcome.
//!
//! A confounding path is blocked at the first observed node it reaches, so
//! both backward searches stop at observed nodes. The search from Outcome
//! also stops at Treatment, since paths through Treatment are causal.

use std::collections::{BTreeSet, HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::graph::{dag_enforcement, CausalGraph};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackdoorReport {
    /// Observed nodes that are not descendants of Treatment.
    pub adjustment_set: BTreeSet<String>,
    /// Unobserved common ancestors reaching both endpoints through
    /// unobserved-only chains.
    pub unobserved_confounders: BTreeSet<String>,
    /// Whether Treatment reaches Outcome at all.
    pub has_directed_path: bool,
    /// Observed nodes downstream of Treatment. Adjusting for them biases the
    /// estimate.
    pub descendant_covariates: BTreeSet<String>,
    pub identifiable: bool,
}

impl BackdoorReport {
    /// Human-readable identification warnings; empty when identifiable.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.has_directed_path {
            warnings.push("no directed path from Treatment to Outcome".to_string());
        }
        if !self.unobserved_confounders.is_empty() {
            warnings.push(format!(
                "unobserved confounders present: {}",
                join(&self.unobserved_confounders)
            ));
        }
        if !self.descendant_covariates.is_empty() {
            warnings.push(format!(
                "covariates downstream of Treatment: {}",
                join(&self.descendant_covariates)
            ));
        }
        warnings
    }
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Screen `graph` for backdoor identification of Treatment -> Outcome.
/// A graph missing either endpoint yields an empty, non-identifiable report.
pub fn analyze(graph: &CausalGraph) -> BackdoorReport {
    let (Some(treatment), Some(outcome)) = (
        graph.get_node(graph.treatment_name()),
        graph.get_node(graph.outcome_name()),
    ) else {
        return BackdoorReport::default();
    };

    let descendants = reachable(graph, treatment);
    let mut adjustment_set = BTreeSet::new();
    let mut descendant_covariates = BTreeSet::new();
    for idx in graph.graph.node_indices() {
        let Some(node) = graph.graph.node_weight(idx) else {
            continue;
        };
        if !node.observed {
            continue;
        }
        if descendants.contains(&idx) {
            descendant_covariates.insert(node.name.clone());
        } else {
            adjustment_set.insert(node.name.clone());
        }
    }

    let from_treatment = unobserved_ancestors(graph, treatment, None);
    let from_outcome = unobserved_ancestors(graph, outcome, Some(treatment));
    let unobserved_confounders: BTreeSet<String> = from_treatment
        .intersection(&from_outcome)
        .filter_map(|&idx| graph.graph.node_weight(idx))
        .map(|n| n.name.clone())
        .collect();

    let has_directed_path = dag_enforcement::has_path(&graph.graph, treatment, outcome);
    let identifiable =
        has_directed_path && unobserved_confounders.is_empty() && descendant_covariates.is_empty();

    BackdoorReport {
        adjustment_set,
        unobserved_confounders,
        has_directed_path,
        descendant_covariates,
        identifiable,
    }
}

/// Every node reachable from `start` along outgoing edges, excluding `start`.
fn reachable(graph: &CausalGraph, start: NodeIndex) -> HashSet<NodeIndex> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for child in graph.graph.neighbors_directed(current, Direction::Outgoing) {
            if visited.insert(child) {
                queue.push_back(child);
            }
        }
    }
    visited
}

/// Unobserved ancestors of `start` reachable through unobserved nodes only.
fn unobserved_ancestors(
    graph: &CausalGraph,
    start: NodeIndex,
    stop_at: Option<NodeIndex>,
) -> HashSet<NodeIndex> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for parent in graph.graph.neighbors_directed(current, Direction::Incoming) {
            if Some(parent) == stop_at || visited.contains(&parent) {
                continue;
            }
            let observed = graph
                .graph
                .node_weight(parent)
                .is_some_and(|n| n.observed);
            if observed {
                continue;
            }
            visited.insert(parent);
            queue.push_back(parent);
        }
    }
    visited
}
