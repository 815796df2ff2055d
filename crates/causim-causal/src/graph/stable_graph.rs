//! petgraph::StableGraph wrapper with CausalNode and DependencyEdge types.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use causim_core::constants::{OUTCOME_NODE, TREATMENT_NODE};
use causim_core::errors::CausalError;
use causim_trace::Tag;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use super::dag_enforcement;

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    State,
    Param,
    Treatment,
    Outcome,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Param => "param",
            Self::Treatment => "treatment",
            Self::Outcome => "outcome",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "state" => Some(Self::State),
            "param" => Some(Self::Param),
            "treatment" => Some(Self::Treatment),
            "outcome" => Some(Self::Outcome),
            _ => None,
        }
    }
}

/// A node in the causal graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalNode {
    /// Unique identifier, e.g. `foxes_3`, `fox_growth_3`, `Treatment`.
    pub name: String,
    pub kind: NodeKind,
    /// Underlying variable or parameter name, for step nodes.
    pub variable: Option<String>,
    pub step: Option<usize>,
    /// Whether the node is part of the dataset's covariate set.
    pub observed: bool,
}

impl CausalNode {
    pub fn from_tag(tag: &Tag) -> Self {
        let kind = match tag {
            Tag::State { .. } => NodeKind::State,
            Tag::Param { .. } => NodeKind::Param,
            Tag::Treatment => NodeKind::Treatment,
            Tag::Outcome => NodeKind::Outcome,
        };
        Self {
            name: tag.node_name(),
            kind,
            variable: tag.variable().map(str::to_string),
            step: tag.step(),
            observed: false,
        }
    }

    pub fn treatment() -> Self {
        Self::from_tag(&Tag::Treatment)
    }

    pub fn outcome() -> Self {
        Self::from_tag(&Tag::Outcome)
    }
}

impl fmt::Display for CausalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Weight on a dependency edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Added by hand (the Treatment -> Outcome export edge) rather than traced.
    pub synthetic: bool,
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.synthetic {
            f.write_str("synthetic")
        } else {
            Ok(())
        }
    }
}

/// The underlying directed graph type.
pub type DependencyStableGraph = StableGraph<CausalNode, DependencyEdge, Directed>;

/// Directed dependency graph with name-indexed access and graph-level
/// covariate ordering.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    /// The petgraph stable graph.
    pub graph: DependencyStableGraph,
    /// Map from node name to NodeIndex for O(1) lookup.
    pub node_index: HashMap<String, NodeIndex>,
    /// Observed node names in covariate column order. List-valued, so it is
    /// not carried through GML export.
    covariate_names: Option<Vec<String>>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a node. An existing node keeps its attributes.
    pub fn ensure_node(&mut self, node: CausalNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.name) {
            return idx;
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(name, idx);
        idx
    }

    pub fn get_node(&self, name: &str) -> Option<NodeIndex> {
        self.node_index.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<&CausalNode> {
        self.get_node(name)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut CausalNode> {
        let idx = self.get_node(name)?;
        self.graph.node_weight_mut(idx)
    }

    /// Add `source -> target` with DAG enforcement.
    ///
    /// Returns `Ok(false)` if the edge already existed.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: DependencyEdge,
    ) -> Result<bool, CausalError> {
        let source_idx = self.get_node(source).ok_or_else(|| CausalError::UnknownNode {
            name: source.to_string(),
        })?;
        let target_idx = self.get_node(target).ok_or_else(|| CausalError::UnknownNode {
            name: target.to_string(),
        })?;
        if self.graph.find_edge(source_idx, target_idx).is_some() {
            return Ok(false);
        }
        if dag_enforcement::would_create_cycle(self, source_idx, target_idx) {
            return Err(CausalError::CycleDetected {
                path: format!("{target} ->* {source} -> {target}"),
            });
        }
        self.graph.add_edge(source_idx, target_idx, weight);
        Ok(true)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.get_node(source), self.get_node(target)) {
            (Some(s), Some(t)) => self.graph.find_edge(s, t).is_some(),
            _ => false,
        }
    }

    /// Add the Treatment -> Outcome edge some consumers require.
    pub fn add_direct_effect_edge(&mut self) -> Result<bool, CausalError> {
        self.add_edge(
            TREATMENT_NODE,
            OUTCOME_NODE,
            DependencyEdge { synthetic: true },
        )
    }

    /// Names of the direct parents of `name`, sorted.
    pub fn parents(&self, name: &str) -> Vec<String> {
        self.neighbor_names(name, Direction::Incoming)
    }

    /// Names of the direct children of `name`, sorted.
    pub fn children(&self, name: &str) -> Vec<String> {
        self.neighbor_names(name, Direction::Outgoing)
    }

    fn neighbor_names(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(idx) = self.get_node(name) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).map(|w| w.name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CausalNode> + '_ {
        self.graph.node_weights()
    }

    /// All node names, sorted.
    pub fn node_names(&self) -> BTreeSet<String> {
        self.node_index.keys().cloned().collect()
    }

    /// All edges as `(source, target)` name pairs, sorted.
    pub fn edge_list(&self) -> BTreeSet<(String, String)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (s, t) = self.graph.edge_endpoints(e)?;
                Some((
                    self.graph.node_weight(s)?.name.clone(),
                    self.graph.node_weight(t)?.name.clone(),
                ))
            })
            .collect()
    }

    /// Names of every node marked observed.
    pub fn observed_nodes(&self) -> BTreeSet<String> {
        self.nodes()
            .filter(|n| n.observed)
            .map(|n| n.name.clone())
            .collect()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&CausalNode> {
        self.nodes().filter(|n| n.kind == kind).collect()
    }

    pub fn covariate_names(&self) -> Option<&[String]> {
        self.covariate_names.as_deref()
    }

    pub(crate) fn set_covariate_names(&mut self, names: Vec<String>) {
        self.covariate_names = Some(names);
    }

    /// Remove and return the covariate ordering.
    pub fn take_covariate_names(&mut self) -> Option<Vec<String>> {
        self.covariate_names.take()
    }

    /// Re-attach the covariate ordering after loading from a format that
    /// cannot carry list-valued graph attributes. Every name must be an
    /// observed node and appear once.
    pub fn reattach_covariate_names(&mut self, names: Vec<String>) -> Result<(), CausalError> {
        let mut seen = BTreeSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(CausalError::DuplicateCovariate { name: name.clone() });
            }
            match self.node(name) {
                Some(node) if node.observed => {}
                Some(_) => return Err(CausalError::CovariateNotObserved { name: name.clone() }),
                None => return Err(CausalError::UnknownNode { name: name.clone() }),
            }
        }
        self.covariate_names = Some(names);
        Ok(())
    }

    pub fn treatment_name(&self) -> &'static str {
        TREATMENT_NODE
    }

    pub fn outcome_name(&self) -> &'static str {
        OUTCOME_NODE
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
