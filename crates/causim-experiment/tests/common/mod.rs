//! Designs that misbehave on purpose, built on the predator–prey preset.

#![allow(dead_code)]

use causim_core::errors::ExperimentError;
use causim_dynamics::lotka_volterra::{FOXES, FOX_GROWTH, RABBITS};
use causim_dynamics::{
    Dynamics, Intervention, LotkaVolterra, SimConfig, Simulator, State, Trajectory,
};
use causim_experiment::design::read_value;
use causim_experiment::presets::PredatorPrey;
use causim_experiment::{Experiment, ExperimentDesign, RunOptions};
use causim_trace::{Recorder, Scalar, Tag};
use rand::{Rng, RngCore};

pub fn options(num_samples: usize) -> RunOptions {
    RunOptions::default().with_samples(num_samples).with_seed(7)
}

pub fn experiment<E: ExperimentDesign>(design: E) -> Experiment<E> {
    Experiment::new(
        "test",
        "test experiment",
        design,
        LotkaVolterra::default_config(6),
        Intervention::new(3, FOX_GROWTH, 0.025),
    )
    .unwrap()
}

/// Starts from a NaN rabbit count with probability `nan_rate`, which the
/// simulator reports as a divergence at step 0.
#[derive(Debug, Clone, Default)]
pub struct Flaky {
    pub inner: PredatorPrey,
    pub nan_rate: f64,
}

impl Flaky {
    pub fn new(nan_rate: f64) -> Self {
        Self {
            inner: PredatorPrey::default(),
            nan_rate,
        }
    }
}

impl ExperimentDesign for Flaky {
    type Dynamics = LotkaVolterra;

    fn simulator(&self) -> &Simulator<LotkaVolterra> {
        self.inner.simulator()
    }

    fn sample_initial_state<R: Recorder>(
        &self,
        rng: &mut dyn RngCore,
        rec: &R,
    ) -> Result<State<R::Scalar>, ExperimentError> {
        if rng.random_bool(self.nan_rate) {
            return Ok(State::new(
                LotkaVolterra.state_names(),
                vec![
                    rec.input(Tag::state(RABBITS, 0), f64::NAN),
                    rec.input(Tag::state(FOXES, 0), 1.0),
                ],
            )?);
        }
        self.inner.sample_initial_state(rng, rec)
    }

    fn propensity<S: Scalar>(
        &self,
        untreated: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<S, ExperimentError> {
        self.inner.propensity(untreated, intervention)
    }

    fn outcome<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        config: &SimConfig,
    ) -> Result<S, ExperimentError> {
        self.inner.outcome(trajectory, config)
    }

    fn covariates<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<Vec<S>, ExperimentError> {
        self.inner.covariates(trajectory, intervention)
    }
}

/// Uses one plus the fox count as its treatment probability.
#[derive(Debug, Clone, Default)]
pub struct Overconfident(pub PredatorPrey);

/// Observes only `rabbits_t`, leaving `foxes_t` as an unobserved confounder.
#[derive(Debug, Clone, Default)]
pub struct RabbitsOnly(pub PredatorPrey);

impl ExperimentDesign for Overconfident {
    type Dynamics = LotkaVolterra;

    fn simulator(&self) -> &Simulator<LotkaVolterra> {
        self.0.simulator()
    }

    fn sample_initial_state<R: Recorder>(
        &self,
        rng: &mut dyn RngCore,
        rec: &R,
    ) -> Result<State<R::Scalar>, ExperimentError> {
        self.0.sample_initial_state(rng, rec)
    }

    fn propensity<S: Scalar>(
        &self,
        untreated: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<S, ExperimentError> {
        Ok(read_value(untreated, FOXES, intervention.time)? + 1.0)
    }

    fn outcome<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        config: &SimConfig,
    ) -> Result<S, ExperimentError> {
        self.0.outcome(trajectory, config)
    }

    fn covariates<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<Vec<S>, ExperimentError> {
        self.0.covariates(trajectory, intervention)
    }
}

impl ExperimentDesign for RabbitsOnly {
    type Dynamics = LotkaVolterra;

    fn simulator(&self) -> &Simulator<LotkaVolterra> {
        self.0.simulator()
    }

    fn sample_initial_state<R: Recorder>(
        &self,
        rng: &mut dyn RngCore,
        rec: &R,
    ) -> Result<State<R::Scalar>, ExperimentError> {
        self.0.sample_initial_state(rng, rec)
    }

    fn propensity<S: Scalar>(
        &self,
        untreated: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<S, ExperimentError> {
        self.0.propensity(untreated, intervention)
    }

    fn outcome<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        config: &SimConfig,
    ) -> Result<S, ExperimentError> {
        self.0.outcome(trajectory, config)
    }

    fn covariates<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<Vec<S>, ExperimentError> {
        Ok(vec![read_value(trajectory, RABBITS, intervention.time)?])
    }
}
