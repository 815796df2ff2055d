//! Builds a [`CausalGraph`] from one traced run.
//!
//! Untagged tape nodes (arithmetic intermediates and constants) are collapsed:
//! every tagged node gets an edge from each of its nearest tagged ancestors.
//! Edges record direct dependency only; transitive reachability is left to
//! consumers.

use std::collections::BTreeSet;

use causim_core::errors::CausalError;
use causim_core::graph_build_span;
use causim_trace::TapeRecord;
use serde::{Deserialize, Serialize};

use crate::graph::{dag_enforcement, CausalGraph, CausalNode, DependencyEdge, NodeKind};

/// Experiment shape the builder needs to place and check the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub intervention_time: usize,
    pub end_time: usize,
    /// Run the time-order and endpoint checks after building.
    pub validate_time_order: bool,
}

impl BuildSpec {
    pub fn new(intervention_time: usize, end_time: usize) -> Self {
        Self {
            intervention_time,
            end_time,
            validate_time_order: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn build(record: &TapeRecord, spec: &BuildSpec) -> Result<CausalGraph, CausalError> {
        let span = graph_build_span!(record.nodes.len());
        let _guard = span.enter();

        let sources = nearest_tagged_sources(record);
        let mut graph = CausalGraph::new();

        for (index, tag) in record.tagged() {
            graph.ensure_node(CausalNode::from_tag(tag));
            let target = tag.node_name();
            for &parent in &record.nodes[index].parents {
                for source in resolve(record, &sources, parent) {
                    let Some(source_tag) = record.nodes[source].tag.as_ref() else {
                        continue;
                    };
                    let source_name = source_tag.node_name();
                    if source_name == target {
                        continue;
                    }
                    graph.ensure_node(CausalNode::from_tag(source_tag));
                    graph.add_edge(&source_name, &target, DependencyEdge::default())?;
                }
            }
        }

        for (what, name) in [
            ("Treatment node", graph.treatment_name()),
            ("Outcome node", graph.outcome_name()),
        ] {
            if graph.get_node(name).is_none() {
                return Err(CausalError::IncompleteTrace {
                    what: what.to_string(),
                });
            }
        }

        let covariate_names = resolve_covariates(record, &sources)?;
        for name in &covariate_names {
            if let Some(node) = graph.node_mut(name) {
                node.observed = true;
            }
        }
        graph.set_covariate_names(covariate_names);

        if spec.validate_time_order {
            dag_enforcement::check_time_order(&graph, spec.intervention_time, spec.end_time)?;
            dag_enforcement::check_endpoints(&graph, spec.intervention_time, spec.end_time)?;
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            observed = graph.observed_nodes().len(),
            "causal graph built"
        );
        Ok(graph)
    }
}

/// For every tape node, the set of nearest tagged ancestors reachable
/// through untagged nodes only. One forward pass: parents precede children.
fn nearest_tagged_sources(record: &TapeRecord) -> Vec<BTreeSet<usize>> {
    let mut sources: Vec<BTreeSet<usize>> = Vec::with_capacity(record.nodes.len());
    for node in &record.nodes {
        let mut set = BTreeSet::new();
        for &parent in &node.parents {
            set.extend(resolve(record, &sources, parent));
        }
        sources.push(set);
    }
    sources
}

/// A tagged node stands for itself; an untagged one for its sources.
fn resolve(record: &TapeRecord, sources: &[BTreeSet<usize>], index: usize) -> BTreeSet<usize> {
    if record.nodes[index].tag.is_some() {
        BTreeSet::from([index])
    } else {
        sources.get(index).cloned().unwrap_or_default()
    }
}

/// Map each registered covariate to exactly one raw state or parameter node.
/// A transformed covariate keeps the name of the raw node it came from.
fn resolve_covariates(
    record: &TapeRecord,
    sources: &[BTreeSet<usize>],
) -> Result<Vec<String>, CausalError> {
    let mut names = Vec::with_capacity(record.covariates.len());
    let mut seen = BTreeSet::new();
    for (position, &index) in record.covariates.iter().enumerate() {
        let resolved: BTreeSet<String> = resolve(record, sources, index)
            .into_iter()
            .filter_map(|i| record.nodes[i].tag.as_ref())
            .map(|tag| (CausalNode::from_tag(tag).kind, tag.node_name()))
            .filter(|(kind, _)| matches!(kind, NodeKind::State | NodeKind::Param))
            .map(|(_, name)| name)
            .collect();
        if resolved.len() != 1 {
            return Err(CausalError::AmbiguousCovariate {
                position,
                sources: resolved.into_iter().collect(),
            });
        }
        let Some(name) = resolved.into_iter().next() else {
            continue;
        };
        if !seen.insert(name.clone()) {
            return Err(CausalError::DuplicateCovariate { name });
        }
        names.push(name);
    }
    Ok(names)
}
