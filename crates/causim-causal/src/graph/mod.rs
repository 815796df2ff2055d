//! Graph storage and structural checks.

pub mod dag_enforcement;
pub mod stable_graph;

pub use stable_graph::{CausalGraph, CausalNode, DependencyEdge, DependencyStableGraph, NodeKind};
