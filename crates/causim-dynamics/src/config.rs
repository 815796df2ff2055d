//! Simulator configuration.

use std::collections::BTreeMap;

use causim_core::config::defaults::DEFAULT_DIVERGENCE_THRESHOLD;
use causim_core::errors::SimulationError;
use serde::{Deserialize, Serialize};

use crate::dynamics::Dynamics;

/// Fixed-step integration scheme applied within each recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    Euler,
    #[default]
    Rk4,
}

/// Parameters plus time discretisation for one simulator run.
///
/// Steps are indexed `0..=end_time`; one step spans `delta_t` time units and
/// is integrated with `substeps` sub-steps of `integrator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub params: BTreeMap<String, f64>,
    pub end_time: usize,
    pub delta_t: f64,
    #[serde(default)]
    pub integrator: Integrator,
    #[serde(default = "default_substeps")]
    pub substeps: usize,
    /// A state value beyond this magnitude counts as a numerical blow-up.
    #[serde(default = "default_divergence_threshold")]
    pub divergence_threshold: f64,
}

fn default_substeps() -> usize {
    10
}

fn default_divergence_threshold() -> f64 {
    DEFAULT_DIVERGENCE_THRESHOLD
}

impl SimConfig {
    pub fn new(params: BTreeMap<String, f64>, end_time: usize) -> Self {
        Self {
            params,
            end_time,
            delta_t: 1.0,
            integrator: Integrator::default(),
            substeps: default_substeps(),
            divergence_threshold: default_divergence_threshold(),
        }
    }

    pub fn with_integrator(mut self, integrator: Integrator, substeps: usize) -> Self {
        self.integrator = integrator;
        self.substeps = substeps;
        self
    }

    pub fn param(&self, name: &str) -> Result<f64, SimulationError> {
        self.params
            .get(name)
            .copied()
            .ok_or_else(|| SimulationError::MissingParameter {
                name: name.to_string(),
            })
    }

    /// Replace an existing parameter value. Unknown names are rejected.
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<(), SimulationError> {
        match self.params.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SimulationError::UnknownParameter {
                name: name.to_string(),
            }),
        }
    }

    /// Check the config against the parameters `dynamics` declares.
    pub fn validate<D: Dynamics>(&self, dynamics: &D) -> Result<(), SimulationError> {
        for name in dynamics.param_names() {
            let value = self.param(name)?;
            if !value.is_finite() {
                return Err(SimulationError::InvalidConfig {
                    field: (*name).to_string(),
                    message: "must be finite".to_string(),
                });
            }
        }
        if let Some(unknown) = self
            .params
            .keys()
            .find(|k| dynamics.param_index(k).is_none())
        {
            return Err(SimulationError::UnknownParameter {
                name: unknown.clone(),
            });
        }
        if !(self.delta_t.is_finite() && self.delta_t > 0.0) {
            return Err(SimulationError::InvalidConfig {
                field: "delta_t".to_string(),
                message: "must be a positive finite number".to_string(),
            });
        }
        if self.substeps == 0 {
            return Err(SimulationError::InvalidConfig {
                field: "substeps".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
