//! # causim-causal
//!
//! Turns one traced simulation run into a static causal dependency graph:
//! nodes are (variable, step) and (parameter, step) pairs plus the synthetic
//! `Treatment` and `Outcome`; edges mean "directly computed from".
//! Includes DAG/time-order enforcement, GML and DOT interchange, and a
//! backdoor screening pass for downstream identification.

pub mod backdoor;
pub mod builder;
pub mod dot;
pub mod gml;
pub mod graph;

pub use backdoor::{analyze, BackdoorReport};
pub use builder::{BuildSpec, GraphBuilder};
pub use dot::to_dot;
pub use gml::{from_gml, read_gml, to_gml, write_gml, GmlExportOptions};
pub use graph::{CausalGraph, CausalNode, DependencyEdge, NodeKind};
