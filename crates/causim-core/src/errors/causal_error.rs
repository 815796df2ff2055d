/// Causal graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CausalError {
    #[error("cycle detected in causal graph: {path}")]
    CycleDetected { path: String },

    #[error("edge {source_node} -> {target_node} goes backward in time")]
    TimeOrderViolation {
        source_node: String,
        target_node: String,
    },

    #[error("expected exactly one {node} node, found {count}")]
    EndpointCount { node: String, count: usize },

    #[error("{node} has an in-edge from {parent}: {reason}")]
    EndpointBounds {
        node: String,
        parent: String,
        reason: String,
    },

    #[error("covariate column {position} resolves to {sources:?}, expected exactly one raw node")]
    AmbiguousCovariate {
        position: usize,
        sources: Vec<String>,
    },

    #[error("covariate {name} appears in more than one column")]
    DuplicateCovariate { name: String },

    #[error("covariate {name} is not an observed node of the graph")]
    CovariateNotObserved { name: String },

    #[error("unknown node: {name}")]
    UnknownNode { name: String },

    #[error("trace has no {what}")]
    IncompleteTrace { what: String },
}

impl super::CausimErrorCode for CausalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => super::error_code::GRAPH_CYCLE,
            _ => super::error_code::GRAPH_ERROR,
        }
    }
}
