//! The experiment descriptor.

use causim_causal::BuildSpec;
use causim_core::errors::{CausimResult, ExperimentError};
use causim_dynamics::{Intervention, SimConfig};

use crate::dataset::Dataset;
use crate::design::ExperimentDesign;
use crate::options::RunOptions;
use crate::runner;

/// One reproducible causal experiment.
#[derive(Debug, Clone)]
pub struct Experiment<E> {
    pub name: String,
    pub description: String,
    pub design: E,
    pub config: SimConfig,
    pub intervention: Intervention,
}

impl<E: ExperimentDesign> Experiment<E> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        design: E,
        config: SimConfig,
        intervention: Intervention,
    ) -> Result<Self, ExperimentError> {
        let experiment = Self {
            name: name.into(),
            description: description.into(),
            design,
            config,
            intervention,
        };
        experiment.validate()?;
        Ok(experiment)
    }

    /// The base configuration must be valid for the dynamics and the
    /// intervention time must lie in `[0, end_time]`.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        let dynamics = self.design.simulator().dynamics();
        self.config.validate(dynamics)?;
        if self.intervention.time > self.config.end_time {
            return Err(ExperimentError::InterventionOutOfRange {
                time: self.intervention.time,
                end_time: self.config.end_time,
            });
        }
        self.intervention.validate(&self.config, dynamics)?;
        Ok(())
    }

    pub fn build_spec(&self, validate_time_order: bool) -> BuildSpec {
        BuildSpec {
            intervention_time: self.intervention.time,
            end_time: self.config.end_time,
            validate_time_order,
        }
    }

    /// Run sequentially or on the rayon pool, per `options.parallel`.
    pub fn execute(&self, options: &RunOptions) -> CausimResult<Dataset> {
        if options.parallel {
            runner::run_parallel(self, options)
        } else {
            runner::run(self, options)
        }
    }
}
