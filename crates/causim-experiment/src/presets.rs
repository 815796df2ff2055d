//! Ready-made experiments.

use causim_core::errors::ExperimentError;
use causim_dynamics::lotka_volterra::{FOXES, FOX_GROWTH, RABBITS};
use causim_dynamics::{Dynamics, Intervention, LotkaVolterra, SimConfig, Simulator, State, Trajectory};
use causim_trace::{Recorder, Scalar, Tag};
use rand::{Rng, RngCore};

use crate::design::{read_value, ExperimentDesign};
use crate::experiment::Experiment;

/// Predator–prey design: rabbits ~ U[10, 100], foxes ~ rabbits · U[0.1, 0.8].
/// Treatment is likelier the more foxes there are at the intervention time;
/// the outcome is the fox count at the final step.
#[derive(Debug, Clone)]
pub struct PredatorPrey {
    simulator: Simulator<LotkaVolterra>,
    pub rabbit_range: (f64, f64),
    pub fox_fraction: (f64, f64),
    /// Fox count at which the propensity is halfway up its range.
    pub fox_half_saturation: f64,
    /// Propensity bounds; must lie in [0, 1].
    pub propensity_floor: f64,
    pub propensity_ceiling: f64,
}

impl Default for PredatorPrey {
    fn default() -> Self {
        Self {
            simulator: Simulator::new(LotkaVolterra),
            rabbit_range: (10.0, 100.0),
            fox_fraction: (0.1, 0.8),
            fox_half_saturation: 20.0,
            propensity_floor: 0.2,
            propensity_ceiling: 0.8,
        }
    }
}

impl ExperimentDesign for PredatorPrey {
    type Dynamics = LotkaVolterra;

    fn simulator(&self) -> &Simulator<LotkaVolterra> {
        &self.simulator
    }

    fn sample_initial_state<R: Recorder>(
        &self,
        rng: &mut dyn RngCore,
        rec: &R,
    ) -> Result<State<R::Scalar>, ExperimentError> {
        let rabbits = rng.random_range(self.rabbit_range.0..=self.rabbit_range.1);
        let fraction = rng.random_range(self.fox_fraction.0..=self.fox_fraction.1);
        // Foxes are drawn relative to rabbits, so foxes_0 depends on rabbits_0.
        let rabbits = rec.input(Tag::state(RABBITS, 0), rabbits);
        let foxes = rec.record(Tag::state(FOXES, 0), rabbits * fraction);
        Ok(State::new(LotkaVolterra.state_names(), vec![rabbits, foxes])?)
    }

    fn propensity<S: Scalar>(
        &self,
        untreated: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<S, ExperimentError> {
        let foxes = read_value(untreated, FOXES, intervention.time)?;
        let saturation = foxes / (foxes + self.fox_half_saturation);
        Ok(saturation * (self.propensity_ceiling - self.propensity_floor) + self.propensity_floor)
    }

    fn outcome<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        config: &SimConfig,
    ) -> Result<S, ExperimentError> {
        read_value(trajectory, FOXES, config.end_time)
    }

    fn covariates<S: Scalar>(
        &self,
        trajectory: &Trajectory<S>,
        intervention: &Intervention,
    ) -> Result<Vec<S>, ExperimentError> {
        let now = intervention.time;
        let before = now.checked_sub(1).ok_or_else(|| ExperimentError::InvalidDesign {
            message: "covariates need a step before the intervention".to_string(),
        })?;
        Ok(vec![
            read_value(trajectory, RABBITS, before)?,
            read_value(trajectory, FOXES, before)?,
            read_value(trajectory, RABBITS, now)?,
            read_value(trajectory, FOXES, now)?,
        ])
    }
}

/// The predator–prey experiment: raise `fox_growth` to 0.025 at
/// `intervention_time`, observe foxes at `end_time`.
pub fn predator_prey(
    intervention_time: usize,
    end_time: usize,
) -> Result<Experiment<PredatorPrey>, ExperimentError> {
    if intervention_time == 0 {
        return Err(ExperimentError::InvalidDesign {
            message: "intervention_time must be at least 1".to_string(),
        });
    }
    let config = LotkaVolterra::default_config(end_time);
    Experiment::new(
        "predator_prey",
        "Does raising fox growth at the intervention time increase the final fox count?",
        PredatorPrey::default(),
        config,
        Intervention::new(intervention_time, FOX_GROWTH, 0.025),
    )
}
