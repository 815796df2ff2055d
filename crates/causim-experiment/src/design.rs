//! The user-supplied half of an experiment.

use causim_core::errors::ExperimentError;
use causim_dynamics::{Dynamics, Intervention, SimConfig, Simulator, State, Trajectory};
use causim_trace::{Recorder, Scalar};
use rand::RngCore;

/// State sampler, propensity scorer, outcome extractor and covariate
/// builder for one experiment.
///
/// Every method is generic over the scalar type so a single definition runs
/// untraced for every sample and traced for the representative one. A
/// design must draw randomness only from `rng` and must not branch on
/// scalar values in a way that changes which values it reads.
pub trait ExperimentDesign: Send + Sync {
    type Dynamics: Dynamics;

    fn simulator(&self) -> &Simulator<Self::Dynamics>;

    /// Draw the initial state. Values must enter through `rec.input`.
    fn sample_initial_state<R: Recorder>(
        &self,
        rng: &mut dyn RngCore,
        rec: &R,
    ) -> Result<State<R::Scalar>, ExperimentError>;

    /// Treatment probability from the untreated run up to the intervention
    /// time. Must lie in `[0, 1]`.
    fn propensity<S: Scalar>(
        &self,
        untreated: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<S, ExperimentError>;

    /// The scalar outcome of a finished run.
    fn outcome<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        config: &SimConfig,
    ) -> Result<S, ExperimentError>;

    /// Covariate row, in column order.
    fn covariates<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<Vec<S>, ExperimentError>;
}

/// Read `variable` at `step`, or report which value was missing.
pub fn read_value<S: Scalar>(
    trajectory: &Trajectory<S>,
    variable: &str,
    step: usize,
) -> Result<S, ExperimentError> {
    trajectory
        .value(variable, step)
        .ok_or_else(|| ExperimentError::MissingValue {
            variable: variable.to_string(),
            step,
        })
}
