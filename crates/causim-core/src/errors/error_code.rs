//! Stable error codes shared by every error enum.

/// Every error enum implements this to expose a machine-readable code.
pub trait CausimErrorCode {
    /// Returns the error code string (e.g., "SIMULATION_DIVERGED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SIMULATION_ERROR: &str = "SIMULATION_ERROR";
pub const SIMULATION_DIVERGED: &str = "SIMULATION_DIVERGED";
pub const GRAPH_ERROR: &str = "GRAPH_ERROR";
pub const GRAPH_CYCLE: &str = "GRAPH_CYCLE";
pub const GML_ERROR: &str = "GML_ERROR";
pub const SCHEMA_MISMATCH: &str = "SCHEMA_MISMATCH";
pub const DATA_RANGE: &str = "DATA_RANGE";
pub const EXPERIMENT_ERROR: &str = "EXPERIMENT_ERROR";
pub const IDENTIFICATION_BLOCKED: &str = "IDENTIFICATION_BLOCKED";
pub const ESTIMATION_ERROR: &str = "ESTIMATION_ERROR";
