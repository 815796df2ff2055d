//! Simulator errors: bad configuration and numerical divergence.

use super::error_code::{self, CausimErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("missing value for parameter: {name}")]
    MissingParameter { name: String },

    #[error("state has {actual} values, dynamics declare {expected}")]
    StateArity { expected: usize, actual: usize },

    #[error("invalid step range {start}..={end} (end_time {end_time})")]
    InvalidRange {
        start: usize,
        end: usize,
        end_time: usize,
    },

    #[error("invalid config field {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("simulation diverged at step {step}: {variable} = {value}")]
    Diverged {
        step: usize,
        variable: String,
        value: f64,
    },
}

impl CausimErrorCode for SimulationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Diverged { .. } => error_code::SIMULATION_DIVERGED,
            _ => error_code::SIMULATION_ERROR,
        }
    }
}
