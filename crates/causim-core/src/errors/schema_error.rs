//! Schema mismatches between a causal graph and its dataset.

use super::error_code::{self, CausimErrorCode};

/// Raised before handing a dataset to a graph consumer. A positional
/// mismatch between covariate columns and graph node names is never silent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("dataset has no causal graph attached")]
    MissingGraph,

    #[error("causal graph has no covariate_names attribute")]
    MissingCovariateNames,

    #[error("row {row} has {actual} covariates, graph lists {expected}")]
    CovariateWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("covariate column {name} is not an observed graph node")]
    UnobservedColumn { name: String },
}

impl CausimErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        error_code::SCHEMA_MISMATCH
    }
}
