//! Point interventions on a configuration parameter.

use causim_core::errors::SimulationError;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::dynamics::Dynamics;

/// Set parameter `param` to `value` from step `time` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub time: usize,
    pub param: String,
    pub value: f64,
}

impl Intervention {
    pub fn new(time: usize, param: impl Into<String>, value: f64) -> Self {
        Self {
            time,
            param: param.into(),
            value,
        }
    }

    pub fn validate<D: Dynamics>(
        &self,
        config: &SimConfig,
        dynamics: &D,
    ) -> Result<(), SimulationError> {
        if self.time > config.end_time {
            return Err(SimulationError::InvalidRange {
                start: self.time,
                end: self.time,
                end_time: config.end_time,
            });
        }
        if dynamics.param_index(&self.param).is_none() {
            return Err(SimulationError::UnknownParameter {
                name: self.param.clone(),
            });
        }
        if !self.value.is_finite() {
            return Err(SimulationError::InvalidConfig {
                field: self.param.clone(),
                message: "intervention value must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// The override this intervention induces for one arm of the experiment.
    ///
    /// `treated` selects the intervened value; `cause`, when present, is the
    /// traced treatment node the per-step parameter nodes are derived from,
    /// so both arms share one graph topology.
    pub fn override_for<S>(
        &self,
        config: &SimConfig,
        treated: bool,
        cause: Option<S>,
    ) -> Result<ParamOverride<S>, SimulationError> {
        let value = if treated {
            self.value
        } else {
            config.param(&self.param)?
        };
        Ok(ParamOverride {
            param: self.param.clone(),
            from_step: self.time,
            value,
            cause,
        })
    }
}

/// A parameter substitution applied by the simulator from `from_step` on.
#[derive(Debug, Clone)]
pub struct ParamOverride<S> {
    pub param: String,
    pub from_step: usize,
    pub value: f64,
    pub cause: Option<S>,
}

impl<S> ParamOverride<S> {
    pub fn applies(&self, name: &str, step: usize) -> bool {
        step >= self.from_step && self.param == name
    }
}
