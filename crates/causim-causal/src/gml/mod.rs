//! GML interchange for causal graphs.
//!
//! Nodes carry `id`, `label` (the node name), `kind`, `variable`, `step` and
//! `observed "yes"|"no"`. The graph-level `covariate_names` list is never
//! written; reattach it after loading with
//! [`CausalGraph::reattach_covariate_names`].

mod parser;
mod writer;

use std::path::Path;

use causim_core::errors::GmlError;
use serde::{Deserialize, Serialize};

use crate::graph::CausalGraph;

pub use parser::from_gml;
pub use writer::to_gml;

/// Export-time options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmlExportOptions {
    /// Add a Treatment -> Outcome edge to the exported graph. Some consumers
    /// require at least one direct path between the endpoints.
    pub direct_effect_edge: bool,
}

impl Default for GmlExportOptions {
    fn default() -> Self {
        Self {
            direct_effect_edge: true,
        }
    }
}

/// Write `graph` as GML to `path`.
pub fn write_gml(
    graph: &CausalGraph,
    path: impl AsRef<Path>,
    options: &GmlExportOptions,
) -> Result<(), GmlError> {
    let path = path.as_ref();
    let text = to_gml(graph, options)?;
    std::fs::write(path, text).map_err(|e| GmlError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), nodes = graph.node_count(), "wrote GML");
    Ok(())
}

/// Read a GML file written by [`write_gml`].
pub fn read_gml(path: impl AsRef<Path>) -> Result<CausalGraph, GmlError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| GmlError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    from_gml(&text)
}

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

pub(crate) fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"").replace("&amp;", "&")
}
