//! Error handling for causim.
//! One error enum per subsystem, `thiserror` only.

pub mod causal_error;
pub mod causim_error;
pub mod config_error;
pub mod consumer_error;
pub mod error_code;
pub mod experiment_error;
pub mod gml_error;
pub mod schema_error;
pub mod simulation_error;

pub use causal_error::CausalError;
pub use causim_error::{CausimError, CausimResult};
pub use config_error::ConfigError;
pub use consumer_error::ConsumerError;
pub use error_code::CausimErrorCode;
pub use experiment_error::ExperimentError;
pub use gml_error::GmlError;
pub use schema_error::SchemaError;
pub use simulation_error::SimulationError;
