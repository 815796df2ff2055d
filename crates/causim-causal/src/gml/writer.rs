use std::collections::HashMap;
use std::fmt::{self, Write as _};

use causim_core::errors::GmlError;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::{escape, GmlExportOptions};
use crate::graph::CausalGraph;

/// Render `graph` as GML. Node ids follow sorted node names, so the output
/// is stable for a given graph. The ordered covariate list is dropped.
pub fn to_gml(graph: &CausalGraph, options: &GmlExportOptions) -> Result<String, GmlError> {
    let mut graph = graph.clone();
    graph.take_covariate_names();
    if options.direct_effect_edge {
        graph
            .add_direct_effect_edge()
            .map_err(|e| GmlError::InvalidValue {
                field: "edge".to_string(),
                message: e.to_string(),
            })?;
    }

    let mut out = String::new();
    render(&graph, &mut out).map_err(|e| GmlError::InvalidValue {
        field: "graph".to_string(),
        message: e.to_string(),
    })?;
    Ok(out)
}

fn render(graph: &CausalGraph, out: &mut String) -> fmt::Result {
    let names = graph.node_names();
    let ids: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    writeln!(out, "graph [")?;
    writeln!(out, "  directed 1")?;
    for (id, name) in names.iter().enumerate() {
        let Some(node) = graph.node(name) else {
            continue;
        };
        writeln!(out, "  node [")?;
        writeln!(out, "    id {id}")?;
        writeln!(out, "    label \"{}\"", escape(&node.name))?;
        writeln!(out, "    kind \"{}\"", node.kind.as_str())?;
        if let Some(variable) = &node.variable {
            writeln!(out, "    variable \"{}\"", escape(variable))?;
        }
        if let Some(step) = node.step {
            writeln!(out, "    step {step}")?;
        }
        let observed = if node.observed { "yes" } else { "no" };
        writeln!(out, "    observed \"{observed}\"")?;
        writeln!(out, "  ]")?;
    }

    let mut edges: Vec<(usize, usize, bool)> = graph
        .graph
        .edge_references()
        .filter_map(|e| {
            let source = graph.graph.node_weight(e.source())?;
            let target = graph.graph.node_weight(e.target())?;
            Some((
                *ids.get(source.name.as_str())?,
                *ids.get(target.name.as_str())?,
                e.weight().synthetic,
            ))
        })
        .collect();
    edges.sort_unstable();
    for (source, target, synthetic) in edges {
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {source}")?;
        writeln!(out, "    target {target}")?;
        if synthetic {
            writeln!(out, "    synthetic 1")?;
        }
        writeln!(out, "  ]")?;
    }
    writeln!(out, "]")
}
