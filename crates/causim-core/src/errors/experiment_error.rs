//! Run-executor errors.

use super::error_code::{self, CausimErrorCode};
use super::SimulationError;

#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("intervention time {time} outside simulated range [0, {end_time}]")]
    InterventionOutOfRange { time: usize, end_time: usize },

    #[error("sample {sample}: propensity {value} outside [0, 1]")]
    PropensityOutOfRange { sample: usize, value: f64 },

    #[error("sample {sample}: {source}")]
    SampleDiverged {
        sample: usize,
        #[source]
        source: SimulationError,
    },

    #[error("sample {sample}: still diverging after {attempts} attempts")]
    RetriesExhausted { sample: usize, attempts: usize },

    #[error("covariate builder returned {actual} values for sample {sample}, expected {expected}")]
    CovariateArity {
        sample: usize,
        expected: usize,
        actual: usize,
    },

    #[error("trajectory has no value for {variable} at step {step}")]
    MissingValue { variable: String, step: usize },

    #[error("invalid experiment design: {message}")]
    InvalidDesign { message: String },

    #[error("num_samples must be at least 1")]
    NoSamples,

    #[error("every sample was dropped; no dataset can be built")]
    AllSamplesDropped,

    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

impl CausimErrorCode for ExperimentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PropensityOutOfRange { .. } | Self::InterventionOutOfRange { .. } => {
                error_code::DATA_RANGE
            }
            Self::SampleDiverged { .. } | Self::RetriesExhausted { .. } => {
                error_code::SIMULATION_DIVERGED
            }
            Self::Simulation(e) => e.error_code(),
            _ => error_code::EXPERIMENT_ERROR,
        }
    }
}
