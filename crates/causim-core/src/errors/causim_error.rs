//! Workspace-wide error aggregating every subsystem error via `From`.

use super::{
    CausalError, CausimErrorCode, ConfigError, ConsumerError, ExperimentError, GmlError,
    SchemaError, SimulationError,
};

#[derive(Debug, thiserror::Error)]
pub enum CausimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("causal graph error: {0}")]
    Causal(#[from] CausalError),

    #[error("GML error: {0}")]
    Gml(#[from] GmlError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("experiment error: {0}")]
    Experiment(#[from] ExperimentError),

    #[error("consumer error: {0}")]
    Consumer(#[from] ConsumerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CausimErrorCode for CausimError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Simulation(e) => e.error_code(),
            Self::Causal(e) => e.error_code(),
            Self::Gml(e) => e.error_code(),
            Self::Schema(e) => e.error_code(),
            Self::Experiment(e) => e.error_code(),
            Self::Consumer(e) => e.error_code(),
            Self::Serialization(_) | Self::Io(_) => super::error_code::EXPERIMENT_ERROR,
        }
    }
}

pub type CausimResult<T> = Result<T, CausimError>;
