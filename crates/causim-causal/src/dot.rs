//! Graphviz DOT export for visual inspection.

use petgraph::dot::{Config, Dot};

use crate::graph::{CausalGraph, NodeKind};

/// Render `graph` as DOT. Observed nodes are filled, endpoints are boxes,
/// synthetic edges are dashed.
pub fn to_dot(graph: &CausalGraph) -> String {
    let g = &graph.graph;
    let dot = Dot::with_attr_getters(
        g,
        &[Config::EdgeNoLabel],
        &|_, edge| {
            if edge.weight().synthetic {
                "style=dashed".to_string()
            } else {
                String::new()
            }
        },
        &|_, (_, node)| {
            let shape = match node.kind {
                NodeKind::Treatment | NodeKind::Outcome => "box",
                NodeKind::Param => "diamond",
                NodeKind::State => "ellipse",
            };
            if node.observed {
                format!("shape={shape} style=filled")
            } else {
                format!("shape={shape}")
            }
        },
    );
    format!("{dot}")
}
