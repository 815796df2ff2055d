//! Stepping a [`Dynamics`] through time under a recorder.

use causim_core::errors::SimulationError;
use causim_trace::{Recorder, Scalar, Tag};

use crate::config::SimConfig;
use crate::dynamics::Dynamics;
use crate::integrator;
use crate::intervention::ParamOverride;
use crate::state::{State, Trajectory};

/// Every parameter is read through the recorder at every step as a
/// `Param { name, step }` node; every produced value is written as
/// `State { name, step + 1 }`.
#[derive(Debug, Clone, Default)]
pub struct Simulator<D> {
    dynamics: D,
}

impl<D: Dynamics> Simulator<D> {
    pub fn new(dynamics: D) -> Self {
        Self { dynamics }
    }

    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// Read the parameter vector for `step`, applying `overrides` where due.
    pub fn read_params<R: Recorder>(
        &self,
        rec: &R,
        config: &SimConfig,
        step: usize,
        overrides: Option<&ParamOverride<R::Scalar>>,
    ) -> Result<Vec<R::Scalar>, SimulationError> {
        self.dynamics
            .param_names()
            .iter()
            .map(|&name| {
                let tag = Tag::param(name, step);
                match overrides {
                    Some(ov) if ov.applies(name, step) => Ok(match ov.cause {
                        Some(cause) => rec.derived(tag, ov.value, &[cause]),
                        None => rec.input(tag, ov.value),
                    }),
                    _ => Ok(rec.input(tag, config.param(name)?)),
                }
            })
            .collect()
    }

    /// Compute the state at `step + 1` from `state` at `step`.
    pub fn step<R: Recorder>(
        &self,
        rec: &R,
        config: &SimConfig,
        state: &State<R::Scalar>,
        step: usize,
        overrides: Option<&ParamOverride<R::Scalar>>,
    ) -> Result<State<R::Scalar>, SimulationError> {
        let params = self.read_params(rec, config, step, overrides)?;
        let next = integrator::advance(
            &self.dynamics,
            config.integrator,
            config.substeps,
            config.delta_t,
            &params,
            state.values(),
        );

        let names = self.dynamics.state_names();
        let mut values = Vec::with_capacity(names.len());
        for (&name, value) in names.iter().zip(next) {
            check_finite(name, step + 1, value.value(), config.divergence_threshold)?;
            values.push(rec.record(Tag::state(name, step + 1), value));
        }
        State::new(names, values)
    }

    /// Simulate from `initial` (at step 0) through step `until`.
    pub fn run<R: Recorder>(
        &self,
        rec: &R,
        config: &SimConfig,
        initial: State<R::Scalar>,
        until: usize,
        overrides: Option<&ParamOverride<R::Scalar>>,
    ) -> Result<Trajectory<R::Scalar>, SimulationError> {
        let names = self.dynamics.state_names();
        if initial.values().len() != names.len() {
            return Err(SimulationError::StateArity {
                expected: names.len(),
                actual: initial.values().len(),
            });
        }
        let mut values = Vec::with_capacity(names.len());
        for (&name, &value) in names.iter().zip(initial.values()) {
            check_finite(name, 0, value.value(), config.divergence_threshold)?;
            values.push(rec.record(Tag::state(name, 0), value));
        }

        let mut trajectory = Trajectory::new(0, State::new(names, values)?);
        self.resume(rec, config, &mut trajectory, until, overrides)?;
        Ok(trajectory)
    }

    /// Continue `trajectory` from its last step through step `until`.
    pub fn resume<R: Recorder>(
        &self,
        rec: &R,
        config: &SimConfig,
        trajectory: &mut Trajectory<R::Scalar>,
        until: usize,
        overrides: Option<&ParamOverride<R::Scalar>>,
    ) -> Result<(), SimulationError> {
        if until > config.end_time || until < trajectory.last_step() {
            return Err(SimulationError::InvalidRange {
                start: trajectory.last_step(),
                end: until,
                end_time: config.end_time,
            });
        }
        while trajectory.last_step() < until {
            let step = trajectory.last_step();
            let next = self.step(rec, config, trajectory.last(), step, overrides)?;
            trajectory.push(next);
        }
        tracing::trace!(until, "trajectory advanced");
        Ok(())
    }
}

fn check_finite(name: &str, step: usize, value: f64, threshold: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || value.abs() > threshold {
        return Err(SimulationError::Diverged {
            step,
            variable: name.to_string(),
            value,
        });
    }
    Ok(())
}
